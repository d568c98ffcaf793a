//! Multi-stage completion: several sub-properties finish at different times,
//! so the policy ends the phase on the third transition signal instead of the
//! first.

use std::rc::Rc;

use anyhow::Result;
use tracing::info;
use veil_config::VeilConfig;
use veil_host::{MountSlot, SimHost};
use veil_transition::{
    CreateTransitionCallbackInput, Switch, SwitchConfig, SwitchKey, create_transition_callback,
};

use crate::prefix_from;

#[derive(Clone)]
struct Panel {
    label: &'static str,
}

pub fn run(config: &VeilConfig) -> Result<()> {
    let host = SimHost::new();
    let prefix = prefix_from(config);

    // Opacity, transform, then border-radius: the phase is over when the
    // third transition signal lands.
    let policy = create_transition_callback(CreateTransitionCallbackInput {
        on_transition_end: Some(Rc::new(|context| {
            info!(index = context.index, property = context.ident, "completion signal");
            context.index == 2
        })),
        ..Default::default()
    });

    let switch: Switch<Panel> = Switch::new(host.handle());
    let in_mount = MountSlot::new("in-slot");
    let out_mount = MountSlot::new("out-slot");

    let pump = |key: SwitchKey, panel: Panel| {
        host.run_to_idle(|| {
            let render = switch
                .render(SwitchConfig {
                    key: Some(key.clone()),
                    children: vec![panel.clone()],
                    class_prefix: prefix.clone(),
                    in_on_transitioning: Some(policy.clone()),
                    out_on_transitioning: Some(policy.clone()),
                    ..Default::default()
                })
                .expect("switch render");
            in_mount.sync(
                &host,
                render.in_slot.should_render,
                render.in_slot.remounted,
                &render.in_slot.surface,
            );
            out_mount.sync(
                &host,
                render.out_slot.should_render,
                render.out_slot.remounted,
                &render.out_slot.surface,
            );
            switch.commit();
        });
    };

    let first = Panel { label: "first" };
    let second = Panel { label: "second" };

    pump(SwitchKey::from(first.label), first.clone());
    pump(SwitchKey::from(second.label), second.clone());

    for property in ["opacity", "transform", "border-radius"] {
        if let Some(element) = out_mount.element() {
            element.fire_transition_end(property);
        }
        if let Some(element) = in_mount.element() {
            element.fire_transition_end(property);
        }
        pump(SwitchKey::from(second.label), second.clone());
        info!(
            property,
            transitioning = switch.is_transitioning(),
            "after signal"
        );
    }

    info!(keys = ?switch.keys(), "final state");
    Ok(())
}
