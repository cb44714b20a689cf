// Library interface for newsrecall modules
// This allows tests and the binary to import modules

pub mod agent_tools;
pub mod extraction;
pub mod ingest;
pub mod memory;
