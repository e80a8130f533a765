//! Value cells

use crate::{value_type, ACTOR, BOOLEAN, FLOAT, INTEGER, STRING};
use director_core::{NodeBuilder, NodeRegistry, Property, Result};

pub(crate) fn register(registry: &mut NodeRegistry) -> Result<()> {
    registry.register(value_type(BOOLEAN), |_| {
        NodeBuilder::value(value_type(BOOLEAN), false)
    })?;
    registry.register(value_type(INTEGER), |_| NodeBuilder::value(value_type(INTEGER), 0i64))?;
    registry.register(value_type(FLOAT), |_| NodeBuilder::value(value_type(FLOAT), 0.0))?;
    registry.register(value_type(STRING), |_| NodeBuilder::value(value_type(STRING), ""))?;
    registry.register(value_type(ACTOR), |_| {
        NodeBuilder::value(value_type(ACTOR), Property::Actor(None))
    })?;
    Ok(())
}
