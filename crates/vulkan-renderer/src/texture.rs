use std::ops::Deref;

use ash::vk;

use crate::device::Device;
use crate::image::Image;
use crate::Result;

#[derive(Clone, Copy, Debug)]
pub struct Sampler {
    handle: vk::Sampler,

    destroyed: bool,
}

impl Sampler {
    pub unsafe fn new(device: &ash::Device, create_info: vk::SamplerCreateInfo) -> Result<Self> {
        let sampler = device
            .create_sampler(&create_info, None)
            .map_err(|e| format!("create sampler: {:?}", e))?;

        Ok(Self {
            handle: sampler,
            destroyed: false,
        })
    }

    pub unsafe fn basic(device: &ash::Device) -> Result<Self> {
        let create_info = vk::SamplerCreateInfo::builder()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            .anisotropy_enable(false)
            .max_anisotropy(1.0)
            .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
            .unnormalized_coordinates(false)
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(1.0);
        Self::new(device, *create_info)
    }

    pub unsafe fn destroy(&mut self, device: &ash::Device) {
        if self.destroyed {
            panic!("sampler already destroyed")
        }
        device.destroy_sampler(self.handle, None);
        self.destroyed = true;
    }
}

impl Deref for Sampler {
    type Target = vk::Sampler;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Texture {
    image: Image,
    image_view: vk::ImageView,
    sampler: Sampler,

    destroyed: bool,
}

impl Texture {
    pub unsafe fn new(device: &ash::Device, image: Image, sampler: Sampler) -> Result<Self> {
        let image_view = image.create_view(
            device,
            vk::ImageViewType::TYPE_2D,
            vk::ImageAspectFlags::COLOR,
        )?;
        Ok(Self {
            image,
            image_view,
            sampler,
            destroyed: false,
        })
    }

    pub unsafe fn from_image(device: &ash::Device, image: Image) -> Result<Self> {
        let sampler = Sampler::basic(device)?;
        Self::new(device, image, sampler)
    }

    /// Creates a sampled texture from a decoded RGBA image and uploads the
    /// pixel data to device-local memory.
    pub unsafe fn from_rgba8(
        device: &Device,
        command_pool: vk::CommandPool,
        rgba: &image::RgbaImage,
    ) -> Result<Self> {
        let (width, height) = rgba.dimensions();
        let create_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .format(vk::Format::R8G8B8A8_SRGB)
            .extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        let mut image = Image::new(
            device,
            device.memory_properties(),
            *create_info,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )
        .map_err(|e| format!("create texture image: {:?}", e))?;

        image
            .upload_gpu(device, command_pool, rgba.as_raw())
            .map_err(|e| format!("upload texture pixels: {:?}", e))?;

        Self::from_image(device, image)
    }

    pub fn image_view(&self) -> vk::ImageView {
        self.image_view
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub unsafe fn destroy(&mut self, device: &ash::Device) {
        if self.destroyed {
            panic!("texture already destroyed")
        }

        self.sampler.destroy(device);
        device.destroy_image_view(self.image_view, None);
        self.image.destroy(device);

        self.destroyed = true;
    }
}
