//! Drive a tween engine from a fixed frame loop
//!
//! A sprite slides right, then its completion callback chains a fade-out on
//! the same owner. Pressing "cancel" halfway through the fade removes it.
//!
//! Run with `RUST_LOG=blinc_tween=trace cargo run --example frame_loop`.

use anyhow::Result;
use blinc_tween::{EngineConfig, TweenEngine, TweenValue, ValueKind};
use std::cell::Cell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct EntityId(u32);

#[derive(Default)]
struct Sprite {
    x: Cell<f32>,
    alpha: Cell<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let engine = TweenEngine::with_config(EngineConfig::default());
    engine.register_interpolator(ValueKind::Double, blinc_tween::lerp_double);

    let sprite = Rc::new(Sprite::default());
    sprite.alpha.set(1.0);
    let id = EntityId(7);

    let handle = engine.handle();
    let slide_target = sprite.clone();
    let fade_target = sprite.clone();
    engine.add_with_completion(
        id,
        move |v: TweenValue| slide_target.x.set(v.as_f32().unwrap_or_default()),
        0.0_f32,
        120.0,
        6,
        move || {
            let fade = handle.add(
                id,
                move |v: TweenValue| fade_target.alpha.set(v.as_f64().unwrap_or_default()),
                1.0_f64,
                0.0,
                8,
            );
            if let Err(err) = fade {
                tracing::error!("failed to chain fade: {}", err);
            }
        },
    )?;

    let mut frame = 0;
    while engine.advance() {
        frame += 1;
        println!(
            "frame {:>2}: x = {:>6.1}, alpha = {:.3}",
            frame,
            sprite.x.get(),
            sprite.alpha.get()
        );

        if frame == 12 {
            println!("cancel");
            engine.remove_all(&id);
        }
    }

    println!("settled after {} ticks: {:?}", engine.tick(), engine.stats());
    Ok(())
}
