use crate::entity::Entity;

/// Fills in default property values for an entity. Runs once per entity,
/// the first time it passes through the marshaling pipeline.
pub trait DefaultsHook {
    fn set_defaults(&self, entity: &mut Entity);
}

impl<F> DefaultsHook for F
where
    F: Fn(&mut Entity),
{
    fn set_defaults(&self, entity: &mut Entity) {
        self(entity)
    }
}
