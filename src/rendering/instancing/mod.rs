mod instance_data;
mod instance_group;

pub use instance_data::InstanceData;
pub use instance_group::InstanceGroup;
