use crate::entity::Entity;

/// Pipeline that turns a raw row (or caller-supplied record) into a
/// well-typed entity
pub trait Marshaler {
    fn primary_key_column(&self) -> &str;

    /// Cast declared columns to their column type, filling missing ones with defaults
    fn cast_columns(&self, entity: &mut Entity);

    /// Remove one level of backslash escaping from every string
    fn strip_slashes(&self, entity: &mut Entity);

    /// Decode serialized columns that hold text
    fn unserialize_columns(&self, entity: &mut Entity);

    /// Run the defaults hook
    fn set_defaults(&self, entity: &mut Entity);

    fn convert_to_entity(&self, entity: &mut Entity) {
        entity.set_id_field(self.primary_key_column());
        self.cast_columns(entity);
        self.strip_slashes(entity);
        self.unserialize_columns(entity);
        if !entity.has_default_values() {
            self.set_defaults(entity);
            entity.mark_defaults_set();
        }
    }
}
