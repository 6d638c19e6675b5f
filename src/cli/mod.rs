pub mod orchestration;

pub use orchestration::{
    build_pipeline, init_version, run_bump_workflow, set_version, show_version, BumpWorkflowArgs,
    WorkflowResult,
};
