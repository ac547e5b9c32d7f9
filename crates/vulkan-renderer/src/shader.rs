use std::io::Cursor;
use std::ops::Deref;

use ash::util::read_spv;
use ash::vk;

use crate::Result;

/// A compiled SPIR-V module. Pipeline creation picks an entry point out
/// of it per stage; one module may serve several stages.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Shader {
    pub handle: vk::ShaderModule,

    destroyed: bool,
}

impl Shader {
    /// Builds a shader module from raw SPIR-V bytes, typically the output
    /// of `include_bytes!` on a build-script artifact.
    pub unsafe fn from_spv(device: &ash::Device, bytes: &[u8]) -> Result<Self> {
        let code =
            read_spv(&mut Cursor::new(bytes)).map_err(|e| format!("read shader spv: {:?}", e))?;
        let shader_info = vk::ShaderModuleCreateInfo::builder().code(&code);

        let handle = device
            .create_shader_module(&shader_info, None)
            .map_err(|e| format!("create shader module: {:?}", e))?;

        Ok(Self {
            handle,
            destroyed: false,
        })
    }

    pub unsafe fn destroy(&mut self, device: &ash::Device) {
        if self.destroyed {
            panic!("shader already destroyed")
        }
        device.destroy_shader_module(self.handle, None);
        self.destroyed = true;
    }
}

impl Deref for Shader {
    type Target = vk::ShaderModule;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}
