use sea_orm_migration::{MigrationTrait, MigratorTrait, async_trait::async_trait};

mod m001_create_sync_checkpoint;
mod m002_create_leaves;
mod m003_create_unspents;

pub(crate) struct Migrator;

#[async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m001_create_sync_checkpoint::Migration),
            Box::new(m002_create_leaves::Migration),
            Box::new(m003_create_unspents::Migration),
        ]
    }
}
