use embedded_graphics::{
    prelude::{Point, Size},
    primitives::Rectangle,
};
use log::{debug, info};
use tdeck_touch::{focus::TapFocus, touch::active_config, Gesture};

use super::config::{GESTURES, LAUNCHER_ROWS, LAUNCHER_ROW_HEIGHT, LAUNCHER_ROW_TOP};

fn launcher_focus() -> TapFocus<LAUNCHER_ROWS> {
    let width = u32::from(active_config().width);
    let mut focus = TapFocus::new();
    let mut top = LAUNCHER_ROW_TOP;
    for _ in 0..LAUNCHER_ROWS {
        let row = Rectangle::new(Point::new(0, top), Size::new(width, LAUNCHER_ROW_HEIGHT));
        if focus.add_region(row).is_err() {
            break;
        }
        top += LAUNCHER_ROW_HEIGHT as i32;
    }
    focus
}

#[embassy_executor::task]
pub(crate) async fn launcher_task() {
    let mut focus = launcher_focus();

    loop {
        let gesture = GESTURES.receive().await;
        match gesture {
            Gesture::Tap { .. } => {
                if let Some(change) = focus.handle(gesture) {
                    info!(
                        "launcher: focus {:?} -> {}",
                        change.previous, change.current
                    );
                }
            }
            Gesture::LongPress { x, y } => {
                info!("launcher: long press x={} y={} focused={:?}", x, y, focus.focused());
            }
            Gesture::Drag { x, y } => debug!("launcher: drag x={} y={}", x, y),
            Gesture::None => {}
        }
    }
}
