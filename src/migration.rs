//! Schema migration across registered mappers
//!
//! Relational mappers add declared columns their table lacks; document
//! mappers have nothing to migrate.

use crate::core::DataMapperFactory;
use crate::errors::DataMapperError;
use mapper_object::BackendKind;

impl DataMapperFactory {
    /// Migrate every registered relational mapper.
    /// Returns the number of columns added per mapper name, sorted by name.
    pub fn migrate_all(&self) -> Result<Vec<(String, usize)>, DataMapperError> {
        let mut names: Vec<&String> = self
            .mappers()
            .filter(|(_, mapper)| mapper.kind() == BackendKind::Relational)
            .map(|(name, _)| name)
            .collect();
        names.sort();

        let mut report = Vec::with_capacity(names.len());
        for name in names {
            let mapper = self.get(name)?;
            let added = mapper.migrate()?;
            debug_log!("Migrated '{}': {} column(s) added", name, added);
            report.push((name.clone(), added));
        }
        Ok(report)
    }

    /// Migrate a mapper, then register it. Returns the columns added.
    pub fn register_with_migration(
        &mut self,
        name: &str,
        mapper: mapper_object::DataMapper,
    ) -> Result<usize, DataMapperError> {
        let added = mapper.migrate()?;
        self.register(name, mapper)?;
        Ok(added)
    }
}
