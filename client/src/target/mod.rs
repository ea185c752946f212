mod update_target;

pub use update_target::UpdateTarget;
