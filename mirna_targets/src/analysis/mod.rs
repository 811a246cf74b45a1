pub mod naming;
pub mod tool_comparison;
pub mod collapse;
pub mod threshold;
