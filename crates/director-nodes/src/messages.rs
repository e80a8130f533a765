//! Outbound message nodes

use crate::{MESSAGES, SEND_MESSAGE};
use director_core::{
    NodeBehavior, NodeBuilder, NodeRegistry, NodeResult, NodeTypeId, Property, Result,
    UpdateContext, ValueLink,
};

pub(crate) fn register(registry: &mut NodeRegistry) -> Result<()> {
    registry.register(NodeTypeId::new(SEND_MESSAGE, MESSAGES), |_| SendMessage::builder())
}

/// Hands `MessageName` with its `Param` to the host bridge, then fires `Out`
///
/// `Param` accepts a value of any type; every bound cell becomes one entry
/// of the message parameters (`Param`, `Param1`, `Param2`...).
#[derive(Debug, Default)]
pub struct SendMessage;

impl SendMessage {
    pub fn builder() -> NodeBuilder {
        NodeBuilder::action(NodeTypeId::new(SEND_MESSAGE, MESSAGES), SendMessage)
            .input("In")
            .output("Out")
            .property("MessageName", "")
            .value_link(
                ValueLink::input("Param", Property::from(""))
                    .type_checked(false)
                    .allow_multiple(true),
            )
    }
}

impl NodeBehavior for SendMessage {
    fn update(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        _input: Option<usize>,
        _first_update: bool,
    ) -> NodeResult<bool> {
        let mut message = ctx.message(ctx.get_string("MessageName")?);
        for slot in 0..ctx.value_slot_count("Param") {
            let key = match slot {
                0 => "Param".to_string(),
                n => format!("Param{}", n),
            };
            if let Some(value) = ctx.link_value("Param", slot) {
                message.params.insert(key, value.clone());
            }
        }
        ctx.send_message(message);
        ctx.activate_output("Out")?;
        Ok(false)
    }
}
