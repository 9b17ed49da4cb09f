use pretty_assertions::assert_eq;
use rspirv::dr::{Builder, Module};
use rspirv::spirv::{
    AddressingModel, Capability, ExecutionModel, FunctionControl, MemoryModel, MemorySemantics,
    Scope, Word,
};
use spirv_val_barriers::{validate_module, ErrorKind, TargetEnv, ValidatorOptions};

/// A shader module with a few functions, each with a single block.
struct Shader {
    b: Builder,
    void: Word,
    fn_void: Word,
    u32: Word,
    workgroup: Word,
}

impl Shader {
    fn new() -> Self {
        let mut b = Builder::new();
        b.set_version(1, 0);
        b.capability(Capability::Shader);
        b.memory_model(AddressingModel::Logical, MemoryModel::GLSL450);
        let void = b.type_void();
        let fn_void = b.type_function(void, Vec::<Word>::new());
        let u32 = b.type_int(32, 0);
        let workgroup = b.constant_u32(u32, Scope::Workgroup as u32);
        Self {
            b,
            void,
            fn_void,
            u32,
            workgroup,
        }
    }

    fn semantics(&mut self, semantics: MemorySemantics) -> Word {
        self.b.constant_u32(self.u32, semantics.bits())
    }

    fn begin(&mut self) -> Word {
        let id = self
            .b
            .begin_function(self.void, None, FunctionControl::NONE, self.fn_void)
            .unwrap();
        self.b.begin_block(None).unwrap();
        id
    }

    fn end(&mut self) {
        self.b.ret().unwrap();
        self.b.end_function().unwrap();
    }

    fn call(&mut self, callee: Word) {
        self.b
            .function_call(self.void, None, callee, Vec::<Word>::new())
            .unwrap();
    }

    fn control_barrier(&mut self, semantics: Word) {
        let workgroup = self.workgroup;
        self.b.control_barrier(workgroup, workgroup, semantics).unwrap();
    }

    fn memory_barrier(&mut self, semantics: Word) {
        let workgroup = self.workgroup;
        self.b.memory_barrier(workgroup, semantics).unwrap();
    }

    fn entry_point(&mut self, model: ExecutionModel, function: Word) {
        self.b.entry_point(model, function, "main", Vec::<Word>::new());
    }

    fn finish(self) -> Module {
        self.b.module()
    }
}

fn acq_rel_workgroup() -> MemorySemantics {
    MemorySemantics::ACQUIRE_RELEASE | MemorySemantics::WORKGROUP_MEMORY
}

/// `helper` holds a control barrier, and is called from an entry point of `model`.
fn barrier_in_helper(model: ExecutionModel) -> Module {
    let mut s = Shader::new();
    let semantics = s.semantics(acq_rel_workgroup());

    let helper = s.begin();
    s.control_barrier(semantics);
    s.end();

    let main = s.begin();
    s.call(helper);
    s.end();

    s.entry_point(model, main);
    s.finish()
}

fn validate(module: &Module, target_env: TargetEnv) -> spirv_val_barriers::Result<()> {
    validate_module(module, target_env, &ValidatorOptions::default())
}

#[test]
fn compute_shader_with_barriers() {
    let mut s = Shader::new();
    let semantics = s.semantics(acq_rel_workgroup());
    let main = s.begin();
    s.control_barrier(semantics);
    s.memory_barrier(semantics);
    s.end();
    s.entry_point(ExecutionModel::GLCompute, main);

    let module = s.finish();
    for &env in &[
        TargetEnv::Universal_1_0,
        TargetEnv::Vulkan_1_0,
        TargetEnv::Vulkan_1_2,
    ] {
        assert_eq!(validate(&module, env), Ok(()), "{:?}", env);
    }
}

#[test]
fn control_barrier_reached_from_vertex_shader() {
    let module = barrier_in_helper(ExecutionModel::Vertex);

    let err = validate(&module, TargetEnv::Vulkan_1_0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::DeferredExecutionModelViolation);
    assert_eq!(
        err.to_string(),
        "execution model violation:0 - OpControlBarrier requires one of the following \
         Execution Models: TessellationControl, GLCompute or Kernel"
    );

    // SPIR-V 1.3 lifted the restriction.
    assert_eq!(validate(&module, TargetEnv::Vulkan_1_1), Ok(()));
    assert_eq!(validate(&module, TargetEnv::Universal_1_3), Ok(()));
}

#[test]
fn control_barrier_reached_from_allowed_models() {
    for model in [
        ExecutionModel::TessellationControl,
        ExecutionModel::GLCompute,
        ExecutionModel::Kernel,
        ExecutionModel::TaskNV,
        ExecutionModel::MeshNV,
    ] {
        let module = barrier_in_helper(model);
        assert_eq!(validate(&module, TargetEnv::Universal_1_0), Ok(()));
    }
}

#[test]
fn every_reaching_entry_point_is_checked() {
    let mut s = Shader::new();
    let semantics = s.semantics(acq_rel_workgroup());

    let helper = s.begin();
    s.control_barrier(semantics);
    s.end();

    let middle = s.begin();
    s.call(helper);
    s.end();

    let compute = s.begin();
    s.call(helper);
    s.end();

    let fragment = s.begin();
    s.call(middle);
    s.end();

    s.entry_point(ExecutionModel::GLCompute, compute);
    s.entry_point(ExecutionModel::Fragment, fragment);

    let err = validate(&s.finish(), TargetEnv::Universal_1_2).unwrap_err();
    assert_eq!(err.kind, ErrorKind::DeferredExecutionModelViolation);
    assert_eq!(err.location.unwrap().function, helper);
}

#[test]
fn unreachable_functions_are_not_restricted() {
    let mut s = Shader::new();
    let semantics = s.semantics(acq_rel_workgroup());

    s.begin();
    s.control_barrier(semantics);
    s.end();

    let main = s.begin();
    s.end();
    s.entry_point(ExecutionModel::Vertex, main);

    assert_eq!(validate(&s.finish(), TargetEnv::Universal_1_0), Ok(()));
}

#[test]
fn scan_errors_win_over_deferred_ones() {
    let mut s = Shader::new();
    let good = s.semantics(acq_rel_workgroup());
    let conflicting = s.semantics(MemorySemantics::ACQUIRE | MemorySemantics::RELEASE);
    let make_visible = s.semantics(MemorySemantics::MAKE_VISIBLE_KHR | MemorySemantics::RELEASE);

    let main = s.begin();
    s.control_barrier(good);
    s.memory_barrier(conflicting);
    s.memory_barrier(make_visible);
    s.end();
    s.entry_point(ExecutionModel::Vertex, main);

    let err = validate(&s.finish(), TargetEnv::Universal_1_0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConflictingMemoryOrderBits);
    assert_eq!(err.location.unwrap().index, 1);
    assert_eq!(
        err.to_string(),
        "conflicting memory order bits:1 - OpMemoryBarrier: Memory Semantics can have at most \
         one of the following bits set: Acquire, Release, AcquireRelease or \
         SequentiallyConsistent"
    );
}

#[test]
fn vulkan_memory_barrier_needs_storage_class() {
    let mut s = Shader::new();
    let acq_rel = s.semantics(MemorySemantics::ACQUIRE_RELEASE);
    let main = s.begin();
    s.memory_barrier(acq_rel);
    s.end();
    s.entry_point(ExecutionModel::GLCompute, main);
    let module = s.finish();

    assert_eq!(validate(&module, TargetEnv::Universal_1_5), Ok(()));
    assert_eq!(
        validate(&module, TargetEnv::Vulkan_1_2).unwrap_err().kind,
        ErrorKind::MissingStorageClassBit
    );
}

#[test]
fn strict_vulkan_control_barriers() {
    let mut s = Shader::new();
    let acq_rel = s.semantics(MemorySemantics::ACQUIRE_RELEASE);
    let main = s.begin();
    s.control_barrier(acq_rel);
    s.end();
    s.entry_point(ExecutionModel::GLCompute, main);
    let module = s.finish();

    assert_eq!(validate(&module, TargetEnv::Vulkan_1_1), Ok(()));

    let strict = ValidatorOptions {
        control_barrier_vulkan_storage_class: true,
        ..Default::default()
    };
    assert_eq!(
        validate_module(&module, TargetEnv::Vulkan_1_1, &strict)
            .unwrap_err()
            .kind,
        ErrorKind::MissingStorageClassBit
    );
}

#[test]
fn spirv_version_of_target_envs() {
    for (env, version) in [
        (TargetEnv::Universal_1_0, (1, 0)),
        (TargetEnv::Vulkan_1_0, (1, 0)),
        (TargetEnv::OpenCL_2_2, (1, 2)),
        (TargetEnv::Vulkan_1_1, (1, 3)),
        (TargetEnv::Vulkan_1_1_Spirv_1_4, (1, 4)),
        (TargetEnv::Vulkan_1_2, (1, 5)),
    ] {
        assert_eq!(env.spirv_version(), version, "{:?}", env);
    }
    assert!(TargetEnv::Vulkan_1_1_Spirv_1_4.is_vulkan());
    assert!(!TargetEnv::Universal_1_5.is_vulkan());
}
