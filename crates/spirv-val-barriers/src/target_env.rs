/// The environment a module is validated for, named after the SPIRV-Tools
/// environments. `Universal_*` only restricts the SPIR-V version.
///
/// Version-dependent barrier rules look at [`TargetEnv::spirv_version`], not at
/// the version in the module header.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TargetEnv {
    Universal_1_0,
    Universal_1_1,
    Universal_1_2,
    Universal_1_3,
    Universal_1_4,
    Universal_1_5,
    Vulkan_1_0,
    Vulkan_1_1,
    /// Vulkan 1.1 with `VK_KHR_spirv_1_4`.
    Vulkan_1_1_Spirv_1_4,
    Vulkan_1_2,
    /// OpenCL 1.2 and 2.0 need `cl_khr_il_program`.
    OpenCL_1_2,
    OpenCLEmbedded_1_2,
    OpenCL_2_0,
    OpenCLEmbedded_2_0,
    OpenCL_2_1,
    OpenCLEmbedded_2_1,
    OpenCL_2_2,
    OpenCLEmbedded_2_2,
    /// OpenGL through `GL_ARB_gl_spirv`.
    OpenGL_4_0,
    OpenGL_4_1,
    OpenGL_4_2,
    OpenGL_4_3,
    OpenGL_4_5,
    WebGPU_0,
}

impl Default for TargetEnv {
    fn default() -> Self {
        Self::Universal_1_5
    }
}

impl TargetEnv {
    /// The highest SPIR-V version, as `(major, minor)`, accepted by this environment.
    pub fn spirv_version(self) -> (u8, u8) {
        use TargetEnv::*;

        match self {
            Universal_1_0 | Vulkan_1_0 | OpenCL_1_2 | OpenCLEmbedded_1_2 | OpenCL_2_0
            | OpenCLEmbedded_2_0 | OpenCL_2_1 | OpenCLEmbedded_2_1 | OpenGL_4_0 | OpenGL_4_1
            | OpenGL_4_2 | OpenGL_4_3 | OpenGL_4_5 => (1, 0),
            Universal_1_1 => (1, 1),
            Universal_1_2 | OpenCL_2_2 | OpenCLEmbedded_2_2 => (1, 2),
            Universal_1_3 | Vulkan_1_1 | WebGPU_0 => (1, 3),
            Universal_1_4 | Vulkan_1_1_Spirv_1_4 => (1, 4),
            Universal_1_5 | Vulkan_1_2 => (1, 5),
        }
    }

    pub fn is_vulkan(self) -> bool {
        matches!(
            self,
            Self::Vulkan_1_0 | Self::Vulkan_1_1 | Self::Vulkan_1_1_Spirv_1_4 | Self::Vulkan_1_2
        )
    }
}
