//! Flow control nodes

use crate::{core_type, BRANCH, DELAY, FOR_LOOP, SWITCH, TOGGLE};
use director_core::{
    NodeBehavior, NodeBuilder, NodeRegistry, NodeResult, Property, PropertySet, Result,
    UpdateContext, ValueLink,
};
use tracing::trace;

pub(crate) fn register(registry: &mut NodeRegistry) -> Result<()> {
    registry.register(core_type(TOGGLE), |_| Toggle::builder())?;
    registry.register(core_type(FOR_LOOP), |_| ForLoop::builder())?;
    registry.register(core_type(SWITCH), Switch::builder)?;
    registry.register(core_type(DELAY), |_| Delay::builder())?;
    registry.register(core_type(BRANCH), |_| Branch::builder())?;
    Ok(())
}

/// Sets, clears or flips a boolean
///
/// Inputs `TurnOn`, `TurnOff` and `Toggle` write the `Value` link (every
/// bound cell), then `Out` fires.
#[derive(Debug, Default)]
pub struct Toggle;

impl Toggle {
    pub const TURN_ON: usize = 0;
    pub const TURN_OFF: usize = 1;
    pub const TOGGLE: usize = 2;

    pub fn builder() -> NodeBuilder {
        NodeBuilder::action(core_type(TOGGLE), Toggle)
            .input("TurnOn")
            .input("TurnOff")
            .input("Toggle")
            .output("Out")
            .value_link(ValueLink::output("Value", false))
    }
}

impl NodeBehavior for Toggle {
    fn update(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        input: Option<usize>,
        _first_update: bool,
    ) -> NodeResult<bool> {
        let value = match input {
            Some(Self::TURN_ON) => true,
            Some(Self::TURN_OFF) => false,
            Some(Self::TOGGLE) => !ctx.get_bool("Value")?,
            _ => return Ok(false),
        };
        ctx.set_property("Value", value);
        ctx.activate_output("Out")?;
        Ok(false)
    }
}

/// Counts from `Start` to `End` inclusive
///
/// Every iteration writes `CurrentIndex` and then runs everything wired to
/// `Out` to completion before the next iteration begins. `Finished` fires
/// once after the last iteration, all within the same tick.
#[derive(Debug, Default)]
pub struct ForLoop {
    current: i64,
}

impl ForLoop {
    pub fn builder() -> NodeBuilder {
        NodeBuilder::action(core_type(FOR_LOOP), ForLoop::default())
            .input("Start")
            .output("Out")
            .output("Finished")
            .value_link(ValueLink::input("Start", 0i64))
            .value_link(ValueLink::input("End", 0i64))
            .value_link(ValueLink::output("CurrentIndex", 0i64))
    }
}

impl NodeBehavior for ForLoop {
    fn update(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        _input: Option<usize>,
        first_update: bool,
    ) -> NodeResult<bool> {
        if first_update {
            self.current = ctx.get_int("Start")?;
        } else {
            self.current += 1;
        }

        if self.current > ctx.get_int("End")? {
            ctx.activate_output("Finished")?;
            return Ok(false);
        }

        trace!(node = %ctx.node_id(), index = self.current, "loop iteration");
        ctx.set_property("CurrentIndex", self.current);
        ctx.push_output("Out")?;
        ctx.push_continuation();
        Ok(false)
    }
}

/// Fires its outputs one after another
///
/// `CurrentIndex` is 1-based and names the output fired by the next `In`.
/// Past the last output a looping switch wraps to `Out1`; a non-looping one
/// fires nothing until `Reset`.
#[derive(Debug, Default)]
pub struct Switch;

impl Switch {
    pub const IN: usize = 0;
    pub const RESET: usize = 1;

    const DEFAULT_OUTPUTS: i64 = 2;

    /// Layout depends on the authored `OutputCount`
    pub fn builder(properties: &PropertySet) -> NodeBuilder {
        let count = properties
            .get("OutputCount")
            .and_then(Property::as_int)
            .unwrap_or(Self::DEFAULT_OUTPUTS)
            .max(1);
        let mut builder = NodeBuilder::action(core_type(SWITCH), Switch)
            .input("In")
            .input("Reset")
            .property("OutputCount", count)
            .property("Looping", false)
            .value_link(ValueLink::input("CurrentIndex", 1i64));
        for i in 1..=count {
            builder = builder.output(format!("Out{}", i));
        }
        builder
    }
}

impl NodeBehavior for Switch {
    fn update(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        input: Option<usize>,
        _first_update: bool,
    ) -> NodeResult<bool> {
        if input == Some(Self::RESET) {
            ctx.set_property("CurrentIndex", 1i64);
            return Ok(false);
        }

        let count = ctx.output_count() as i64;
        let mut index = ctx.get_int("CurrentIndex")?.max(1);
        if index > count {
            if !ctx.get_bool("Looping")? {
                return Ok(false);
            }
            index = 1;
        }

        ctx.activate_output_index((index - 1) as usize);
        ctx.set_property("CurrentIndex", index + 1);
        Ok(false)
    }
}

/// Fires `Out` once `Delay` simulated seconds have passed
///
/// Time starts counting on the tick after `Start`; paused ticks do not
/// count. `Start` while running restarts the countdown, `Cancel` stops it
/// and fires `Cancelled`.
#[derive(Debug, Default)]
pub struct Delay {
    elapsed: f64,
    running: bool,
    last_tick: u64,
}

impl Delay {
    pub const START: usize = 0;
    pub const CANCEL: usize = 1;

    pub fn builder() -> NodeBuilder {
        NodeBuilder::action(core_type(DELAY), Delay::default())
            .input("Start")
            .input("Cancel")
            .output("Out")
            .output("Cancelled")
            .value_link(ValueLink::input("Delay", 1.0))
    }
}

impl NodeBehavior for Delay {
    fn update(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        input: Option<usize>,
        first_update: bool,
    ) -> NodeResult<bool> {
        if input == Some(Self::CANCEL) {
            if self.running {
                self.running = false;
                ctx.activate_output("Cancelled")?;
            }
            return Ok(false);
        }

        let tick = ctx.tick();
        if first_update {
            self.elapsed = 0.0;
            self.running = true;
            self.last_tick = tick;
            if ctx.get_float("Delay")? <= 0.0 {
                self.running = false;
                ctx.activate_output("Out")?;
                return Ok(false);
            }
            return Ok(true);
        }

        // A restart leaves the earlier countdown queued as well; only one may advance per tick
        if !self.running || tick == self.last_tick {
            return Ok(false);
        }
        self.last_tick = tick;
        self.elapsed += ctx.sim_delta();

        if self.elapsed >= ctx.get_float("Delay")? {
            self.running = false;
            ctx.activate_output("Out")?;
            return Ok(false);
        }
        Ok(true)
    }
}

/// Fires `True` or `False` depending on `Condition`
#[derive(Debug, Default)]
pub struct Branch;

impl Branch {
    pub fn builder() -> NodeBuilder {
        NodeBuilder::action(core_type(BRANCH), Branch)
            .input("In")
            .output("True")
            .output("False")
            .value_link(ValueLink::input("Condition", false))
    }
}

impl NodeBehavior for Branch {
    fn update(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        _input: Option<usize>,
        _first_update: bool,
    ) -> NodeResult<bool> {
        if ctx.get_bool("Condition")? {
            ctx.activate_output("True")?;
        } else {
            ctx.activate_output("False")?;
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::{value_type, BOOLEAN, INTEGER};
    use director_core::{Director, DirectorConfig, NodeId, Script};

    fn inputs(log: &Log) -> Vec<Option<usize>> {
        log.borrow().iter().map(|(input, _)| *input).collect()
    }

    #[test]
    fn test_toggle_scenario() {
        let registry = registry();
        let mut script = Script::new();
        let root = script.root();
        let toggle = spawn(&registry, &mut script, root, core_type(TOGGLE), &[]);
        let cell = spawn(&registry, &mut script, root, value_type(BOOLEAN), &[]);
        script.connect_value_by_name(toggle, "Value", cell).unwrap();

        let mut director = Director::new(script);
        let press = |director: &mut Director, input: &str| -> bool {
            director.trigger_input(root, toggle, input).unwrap();
            step(director);
            director.script().node(cell).unwrap().value().unwrap().as_bool().unwrap()
        };

        assert!(press(&mut director, "Toggle"));
        assert!(!press(&mut director, "Toggle"));
        assert!(press(&mut director, "TurnOn"));
        assert!(press(&mut director, "TurnOn"), "TurnOn is not a toggle");
        assert!(!press(&mut director, "TurnOff"));
        assert!(!press(&mut director, "TurnOff"));
    }

    #[test]
    fn test_toggle_writes_every_bound_cell() {
        let registry = registry();
        let mut script = Script::new();
        let root = script.root();
        let toggle = spawn(&registry, &mut script, root, core_type(TOGGLE), &[]);
        let first = spawn(&registry, &mut script, root, value_type(BOOLEAN), &[]);
        let second = spawn(&registry, &mut script, root, value_type(BOOLEAN), &[]);
        script.connect_value_by_name(toggle, "Value", first).unwrap();
        script.connect_value_by_name(toggle, "Value", second).unwrap();

        let mut director = Director::new(script);
        director.trigger_input(root, toggle, "TurnOn").unwrap();
        step(&mut director);

        for cell in [first, second] {
            assert_eq!(
                director.script().node(cell).unwrap().value(),
                Some(&Property::Bool(true))
            );
        }
    }

    #[test]
    fn test_for_loop_scenario() {
        let registry = registry();
        let mut script = Script::new();
        let root = script.root();
        let looping = spawn(
            &registry,
            &mut script,
            root,
            core_type(FOR_LOOP),
            &[("Start", Property::Int(0)), ("End", Property::Int(2))],
        );
        let index = spawn(&registry, &mut script, root, value_type(INTEGER), &[]);
        let (recorder, log) = recorder(&mut script, root);
        script.connect_value_by_name(looping, "CurrentIndex", index).unwrap();
        script.connect_value_by_name(recorder, "Seen", index).unwrap();
        connect(&mut script, looping, "Out", recorder, "In");
        connect(&mut script, looping, "Finished", recorder, "Other");

        let mut director = Director::new(script);
        director.trigger_input(root, looping, "Start").unwrap();
        let report = director.update(0.1, 0.1).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                (Some(0), Property::Int(0)),
                (Some(0), Property::Int(1)),
                (Some(0), Property::Int(2)),
                (Some(1), Property::Int(2)),
            ]
        );
        assert_eq!(report.carried, 0, "nothing may run after Finished");

        step(&mut director);
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn test_nested_loops_complete_depth_first() {
        let registry = registry();
        let mut script = Script::new();
        let root = script.root();
        let outer = spawn(
            &registry,
            &mut script,
            root,
            core_type(FOR_LOOP),
            &[("Start", Property::Int(0)), ("End", Property::Int(1))],
        );
        let inner = spawn(
            &registry,
            &mut script,
            root,
            core_type(FOR_LOOP),
            &[("Start", Property::Int(0)), ("End", Property::Int(2))],
        );
        let (recorder, log) = recorder(&mut script, root);
        connect(&mut script, outer, "Out", inner, "Start");
        connect(&mut script, inner, "Out", recorder, "In");
        connect(&mut script, inner, "Finished", recorder, "Other");
        connect(&mut script, outer, "Finished", recorder, "Third");

        let mut director = Director::new(script).with_config(DirectorConfig::default().with_trace(0));
        director.trigger_input(root, outer, "Start").unwrap();
        let report = director.update(0.1, 0.1).unwrap();

        assert_eq!(
            inputs(&log),
            vec![
                Some(0),
                Some(0),
                Some(0),
                Some(1),
                Some(0),
                Some(0),
                Some(0),
                Some(1),
                Some(2)
            ]
        );
        assert!(report.max_depth <= 4, "loop frames must not pile up");
    }

    #[test]
    fn test_empty_loop_finishes_immediately() {
        let registry = registry();
        let mut script = Script::new();
        let root = script.root();
        let looping = spawn(
            &registry,
            &mut script,
            root,
            core_type(FOR_LOOP),
            &[("Start", Property::Int(3)), ("End", Property::Int(1))],
        );
        let (recorder, log) = recorder(&mut script, root);
        connect(&mut script, looping, "Out", recorder, "In");
        connect(&mut script, looping, "Finished", recorder, "Other");

        let mut director = Director::new(script);
        director.trigger_input(root, looping, "Start").unwrap();
        step(&mut director);
        step(&mut director);

        assert_eq!(inputs(&log), vec![Some(1)]);
    }

    fn switch_script(looping: bool) -> (Director, NodeId, Log) {
        let registry = registry();
        let mut script = Script::new();
        let root = script.root();
        let switch = spawn(
            &registry,
            &mut script,
            root,
            core_type(SWITCH),
            &[
                ("OutputCount", Property::Int(3)),
                ("Looping", Property::Bool(looping)),
                ("CurrentIndex", Property::Int(1)),
            ],
        );
        let (recorder, log) = recorder(&mut script, root);
        connect(&mut script, switch, "Out1", recorder, "In");
        connect(&mut script, switch, "Out2", recorder, "Other");
        connect(&mut script, switch, "Out3", recorder, "Third");
        (Director::new(script), switch, log)
    }

    fn press(director: &mut Director, switch: NodeId, input: &str) {
        let root = director.script().root();
        director.trigger_input(root, switch, input).unwrap();
        step(director);
    }

    #[test]
    fn test_switch_scenario() {
        let (mut director, switch, log) = switch_script(false);
        assert_eq!(director.script().node(switch).unwrap().outputs().len(), 3);
        for _ in 0..4 {
            press(&mut director, switch, "In");
        }
        step(&mut director);

        assert_eq!(inputs(&log), vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_looping_switch_wraps() {
        let (mut director, switch, log) = switch_script(true);
        for _ in 0..4 {
            press(&mut director, switch, "In");
        }
        step(&mut director);

        assert_eq!(inputs(&log), vec![Some(0), Some(1), Some(2), Some(0)]);
    }

    #[test]
    fn test_switch_reset() {
        let (mut director, switch, log) = switch_script(false);
        press(&mut director, switch, "In");
        press(&mut director, switch, "In");
        press(&mut director, switch, "Reset");
        press(&mut director, switch, "In");
        step(&mut director);

        assert_eq!(inputs(&log), vec![Some(0), Some(1), Some(0)]);
    }

    fn delay_script(seconds: f64) -> (Director, NodeId, Log) {
        let registry = registry();
        let mut script = Script::new();
        let root = script.root();
        let delay = spawn(
            &registry,
            &mut script,
            root,
            core_type(DELAY),
            &[("Delay", Property::Float(seconds))],
        );
        let (recorder, log) = recorder(&mut script, root);
        connect(&mut script, delay, "Out", recorder, "In");
        connect(&mut script, delay, "Cancelled", recorder, "Other");
        (Director::new(script), delay, log)
    }

    #[test]
    fn test_delay_waits_for_simulated_time() {
        let (mut director, delay, log) = delay_script(0.25);
        let root = director.script().root();
        director.trigger_input(root, delay, "Start").unwrap();

        director.update(0.1, 0.1).unwrap();
        director.update(0.0, 0.1).unwrap();
        director.update(0.0, 0.1).unwrap();
        director.update(0.1, 0.1).unwrap();
        director.update(0.1, 0.1).unwrap();
        assert!(log.borrow().is_empty(), "paused ticks must not count");

        let report = director.update(0.1, 0.1).unwrap();
        assert_eq!(report.latent, 0);
        director.update(0.1, 0.1).unwrap();
        assert_eq!(inputs(&log), vec![Some(0)]);
        assert_eq!(director.pending(), 0);
    }

    #[test]
    fn test_delay_cancel() {
        let (mut director, delay, log) = delay_script(1.0);
        let root = director.script().root();
        director.trigger_input(root, delay, "Start").unwrap();
        step(&mut director);
        director.trigger_input(root, delay, "Cancel").unwrap();
        for _ in 0..20 {
            step(&mut director);
        }

        assert_eq!(inputs(&log), vec![Some(1)]);
        assert_eq!(director.pending(), 0);
    }

    #[test]
    fn test_delay_restart_counts_once() {
        let (mut director, delay, log) = delay_script(0.35);
        let root = director.script().root();
        director.trigger_input(root, delay, "Start").unwrap();
        step(&mut director);
        step(&mut director);
        director.trigger_input(root, delay, "Start").unwrap();
        for _ in 0..4 {
            step(&mut director);
        }
        assert!(log.borrow().is_empty(), "restart must reset the countdown");

        for _ in 0..2 {
            step(&mut director);
        }
        assert_eq!(inputs(&log), vec![Some(0)]);
    }

    #[test]
    fn test_zero_delay_fires_immediately() {
        let (mut director, delay, log) = delay_script(0.0);
        let root = director.script().root();
        director.trigger_input(root, delay, "Start").unwrap();
        step(&mut director);
        step(&mut director);
        assert_eq!(inputs(&log), vec![Some(0)]);
    }

    #[test]
    fn test_branch_follows_condition() {
        let registry = registry();
        let mut script = Script::new();
        let root = script.root();
        let branch = spawn(&registry, &mut script, root, core_type(BRANCH), &[]);
        let condition = spawn(&registry, &mut script, root, value_type(BOOLEAN), &[]);
        let (recorder, log) = recorder(&mut script, root);
        script.connect_value_by_name(branch, "Condition", condition).unwrap();
        connect(&mut script, branch, "True", recorder, "In");
        connect(&mut script, branch, "False", recorder, "Other");

        let mut director = Director::new(script);
        director.trigger_input(root, branch, "In").unwrap();
        step(&mut director);
        director.script_mut().set_property(branch, "Condition", true);
        director.trigger_input(root, branch, "In").unwrap();
        step(&mut director);
        step(&mut director);

        assert_eq!(inputs(&log), vec![Some(1), Some(0)]);
        assert_eq!(
            director.script().node(condition).unwrap().value(),
            Some(&Property::Bool(true))
        );
    }
}
