use anyhow::Result;
use clap::Subcommand;

use crate::engine::PlanEngine;

#[derive(Subcommand)]
pub enum DismissalCommands {
    /// List live dismissals and when each lapses
    Show {},

    /// Clear the dismissals a limit hit overrides
    ResetLimitHit {},
}

impl DismissalCommands {
    pub fn execute(&self, engine: &PlanEngine) -> Result<()> {
        match self {
            DismissalCommands::Show {} => {
                let active = engine.dismissals().active_dismissals();
                if active.is_empty() {
                    println!("No active dismissals");
                }
                for (kind, until) in active {
                    println!("{:<28} until {}", kind, until.to_rfc3339());
                }
                Ok(())
            }
            DismissalCommands::ResetLimitHit {} => {
                engine.reset_for_limit_hit()?;
                println!("Limit-hit dismissals cleared");
                Ok(())
            }
        }
    }
}
