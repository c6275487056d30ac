pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use policy::{BuildPolicy, BuildStrategy};
pub use reports::{generate_console_report, generate_json_report, generate_markdown_report};
pub use seeds::{resolve_seed_inputs, split_csv};
pub use simulation::{SessionConfig, SessionReport, SimulationSession};
