use mapplot::prelude::*;

/// Drives a map without any UI: mount it on an event bus, replay a drag and
/// a few wheel ticks, and dump the resulting frame as JSON.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("mapplot headless example");
    println!("========================");

    let map = MapPlotBuilder::new()
        .with_view(LatLng::new(37.7749, -122.4194), 12) // San Francisco
        .with_size(1024, 768)
        .with_points(vec![
            PlotPoint::describe(37.8199, -122.4783, "latitude", "longitude"),
            PlotPoint::new(37.7955, -122.3937).with_label("Ferry Building"),
        ])
        .build()?;

    let viewport = map.viewport();
    println!(
        "Center {:.4}, {:.4} at zoom {}, pixel center {:?}",
        viewport.center().lat,
        viewport.center().lng,
        viewport.zoom(),
        viewport.pixel_center()
    );

    let bus = EventBus::new();
    let guard = map.mount(&bus);

    // Drag 200px to the right, finishing outside the container.
    let start = Point::new(512.0, 384.0);
    bus.dispatch(EventTarget::Container, &InputEvent::PointerDown { position: start });
    for step in 1..=4 {
        let position = Point::new(start.x + 50.0 * step as f64, start.y);
        bus.dispatch(EventTarget::Window, &InputEvent::PointerMove { position });
    }
    bus.dispatch(
        EventTarget::Window,
        &InputEvent::PointerUp {
            position: Point::new(712.0, 384.0),
        },
    );

    // Two ticks in, one out.
    for delta_y in [-100.0, -100.0, 100.0] {
        bus.dispatch(
            EventTarget::Container,
            &InputEvent::Wheel {
                delta_y,
                position: start,
            },
        );
    }

    for event in map.take_events() {
        match event {
            MapEvent::MoveStart { focus } => println!("  drag start at {focus:?}"),
            MapEvent::MoveEnd { focus } => println!("  drag end at {focus:?}"),
            MapEvent::ZoomChanged { from, to } => println!("  zoom {from} -> {to}"),
        }
    }

    drop(guard);
    println!("Listeners left after unmount: {}", bus.listener_count());

    let frame = map.frame();
    println!(
        "Frame: {} tiles, {} markers, focus {:.4}, {:.4}",
        frame.tiles.len(),
        frame.markers.len(),
        frame.focus.lat,
        frame.focus.lng
    );
    println!("{}", serde_json::to_string_pretty(&frame)?);

    Ok(())
}
