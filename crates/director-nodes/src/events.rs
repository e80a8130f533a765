//! Event nodes and subgraph entry points

use crate::{core_type, CALL_REMOTE_EVENT, INPUT, OUTPUT, REMOTE_EVENT, START};
use director_core::event::EVENT_NAME_PROPERTY;
use director_core::{
    EventScope, FireOutputs, NodeBehavior, NodeBuilder, NodeRegistry, NodeResult, Result,
    UpdateContext,
};
use tracing::debug;

pub(crate) fn register(registry: &mut NodeRegistry) -> Result<()> {
    registry.register(core_type(START), |_| {
        NodeBuilder::event(core_type(START), FireOutputs).output("Out")
    })?;
    registry.register(core_type(REMOTE_EVENT), |_| {
        NodeBuilder::event(core_type(REMOTE_EVENT), FireOutputs)
            .output("Out")
            .property(EVENT_NAME_PROPERTY, "")
    })?;
    registry.register(core_type(CALL_REMOTE_EVENT), |_| CallRemoteEvent::builder())?;
    registry.register(core_type(INPUT), |_| PassThrough::builder(INPUT))?;
    registry.register(core_type(OUTPUT), |_| PassThrough::builder(OUTPUT))?;
    Ok(())
}

/// Fires every remote event named `EventName` and continues at once
///
/// With `LocalOnly` set only this graph and its nested graphs are searched.
/// The events start their own chains in the next wave.
#[derive(Debug, Default)]
pub struct CallRemoteEvent;

impl CallRemoteEvent {
    pub fn builder() -> NodeBuilder {
        NodeBuilder::action(core_type(CALL_REMOTE_EVENT), CallRemoteEvent)
            .input("In")
            .output("Out")
            .property(EVENT_NAME_PROPERTY, "")
            .property("LocalOnly", true)
    }
}

impl NodeBehavior for CallRemoteEvent {
    fn update(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        _input: Option<usize>,
        _first_update: bool,
    ) -> NodeResult<bool> {
        let name = ctx.get_string(EVENT_NAME_PROPERTY)?;
        let scope = if ctx.get_bool("LocalOnly")? {
            EventScope::Local
        } else {
            EventScope::Global
        };
        if ctx.trigger_remote_event(&name, Some(scope)) == 0 {
            debug!(node = %ctx.node_id(), event = %name, "remote event has no listeners");
        }
        ctx.activate_output("Out")?;
        Ok(false)
    }
}

/// Forwards `In` to `Out`; marks where control enters or leaves a subgraph
#[derive(Debug, Default)]
pub struct PassThrough;

impl PassThrough {
    pub fn builder(name: &str) -> NodeBuilder {
        NodeBuilder::action(core_type(name), PassThrough)
            .input("In")
            .output("Out")
    }
}

impl NodeBehavior for PassThrough {
    fn update(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        _input: Option<usize>,
        _first_update: bool,
    ) -> NodeResult<bool> {
        ctx.activate_output("Out")?;
        Ok(false)
    }
}
