#[derive(Default, Clone, Debug)]
pub struct ValidatorOptions {
    /// Records whether `OpControlBarrier` in a Vulkan environment must, when its
    /// Memory Semantics is not None, include one of the storage classes Vulkan
    /// supports (UniformMemory, WorkgroupMemory, ImageMemory or OutputMemory).
    ///
    /// This mirrors the rule applied to `OpMemoryBarrier`, but is off by default:
    /// shaders accepted by the Vulkan conformance tests violate it.
    pub control_barrier_vulkan_storage_class: bool,
}
