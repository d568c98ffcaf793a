//! Keyed content swap through the switch coordinator, with the timing policy
//! taken from configuration.

use anyhow::Result;
use tracing::info;
use veil_config::VeilConfig;
use veil_host::{MountSlot, SimHost};
use veil_transition::{Switch, SwitchConfig, SwitchKey};

use crate::{prefix_from, timing_from};

#[derive(Clone)]
struct Card {
    title: &'static str,
}

pub fn run(config: &VeilConfig) -> Result<()> {
    let host = SimHost::new();
    let timing = timing_from(config);
    let prefix = prefix_from(config);

    let switch: Switch<Card> = Switch::new(host.handle());
    let in_mount = MountSlot::new("in-slot");
    let out_mount = MountSlot::new("out-slot");

    let pump = |key: SwitchKey, card: Card| {
        host.run_to_idle(|| {
            let render = switch
                .render(SwitchConfig {
                    key: Some(key.clone()),
                    children: vec![card.clone()],
                    timing,
                    class_prefix: prefix.clone(),
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

    let report = |label: &str| {
        if let Some(element) = in_mount.element() {
            info!(slot = "in", classes = ?element.classes(), "{label}");
        }
        if let Some(element) = out_mount.element() {
            info!(slot = "out", classes = ?element.classes(), "{label}");
        }
    };

    // Drive both slots to completion, whatever order the timing policy wants.
    let complete = |key: SwitchKey, card: Card| {
        for _ in 0..4 {
            if !switch.is_transitioning() {
                break;
            }
            if let Some(element) = out_mount.element() {
                element.fire_transition_end("opacity");
            }
            if let Some(element) = in_mount.element() {
                element.fire_transition_end("opacity");
            }
            pump(key.clone(), card.clone());
        }
    };

    info!(?timing, "switch scenario");

    let blue = Card { title: "blue" };
    let orange = Card { title: "orange" };

    pump(SwitchKey::from(blue.title), blue.clone());
    report("initial content");

    pump(SwitchKey::from(orange.title), orange.clone());
    report("transition in flight");

    complete(SwitchKey::from(orange.title), orange.clone());
    report("settled");
    info!(keys = ?switch.keys(), "final state");
    Ok(())
}
