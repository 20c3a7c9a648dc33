pub use sea_orm_migration::prelude::*;

mod m20260301_120000_init;
mod m20260322_090000_goal_contributions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_120000_init::Migration),
            Box::new(m20260322_090000_goal_contributions::Migration),
        ]
    }
}
