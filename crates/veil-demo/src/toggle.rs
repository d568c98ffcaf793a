//! Single-element toggle: show with a scripted completion, hide through the
//! safety-timeout fallback (no completion signal ever arrives).

use std::rc::Rc;

use anyhow::Result;
use tracing::info;
use veil_config::VeilConfig;
use veil_host::{MountSlot, SimHost};
use veil_transition::{Transition, TransitionConfig, default_safety_timeout};

use crate::prefix_from;

pub fn run(config: &VeilConfig) -> Result<()> {
    let host = SimHost::new();
    let prefix = prefix_from(config);

    let base = TransitionConfig {
        class_prefix: prefix,
        on_entering: Some(Rc::new(|| info!("entering"))),
        on_entered: Some(Rc::new(|| info!("entered"))),
        on_exiting: Some(Rc::new(|| info!("exiting"))),
        on_exited: Some(Rc::new(|| info!("exited"))),
        ..Default::default()
    };

    let transition = Transition::new(host.handle(), base.clone());
    let mount = MountSlot::new("panel");

    let pump = |is_active: bool| {
        host.run_to_idle(|| {
            let should_render = transition.render(TransitionConfig {
                is_active,
                ..base.clone()
            });
            mount.sync(&host, should_render, false, &transition.surface_ref());
            transition.commit();
        });
    };

    info!("showing the panel");
    pump(true);
    if let Some(element) = mount.element() {
        info!(classes = ?element.classes(), "mid-entry");
        element.fire_transition_end("opacity");
    }
    pump(true);
    if let Some(element) = mount.element() {
        info!(classes = ?element.classes(), "entry complete");
    }

    info!("hiding the panel; no completion signal will arrive");
    pump(false);
    if let Some(element) = mount.element() {
        info!(classes = ?element.classes(), "mid-exit");
    }
    host.advance(default_safety_timeout());
    pump(false);
    info!(mounted = mount.element().is_some(), "after safety timeout");
    Ok(())
}
