use mapplot::prelude::*;

/// Integration tests for real user interactions and scenarios
/// These tests drive the map the way a host does: through an event bus
#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Helper to create a mounted map at the equator, zoom 1, 512x512
    fn equator_map() -> MapPlot {
        MapPlotBuilder::new()
            .with_view(LatLng::new(0.0, 0.0), 1)
            .with_size(512, 512)
            .build()
            .unwrap()
    }

    fn press(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerDown {
            position: Point::new(x, y),
        }
    }

    fn move_to(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerMove {
            position: Point::new(x, y),
        }
    }

    fn release() -> InputEvent {
        InputEvent::PointerUp {
            position: Point::default(),
        }
    }

    fn wheel(delta_y: f64) -> InputEvent {
        InputEvent::Wheel {
            delta_y,
            position: Point::new(256.0, 256.0),
        }
    }

    #[test]
    fn test_equator_scenario() {
        println!("🧪 [TEST] equator grid at zoom 1");

        let map = equator_map();
        assert_eq!(map.viewport().pixel_center(), Point::new(256.0, 256.0));

        let grid = map.tile_grid();
        assert_eq!((grid.layout.cols, grid.layout.rows), (4, 4));

        let keys = grid.keys();
        let expected: HashSet<TileCoord> = [(0, 0), (1, 0), (0, 1), (1, 1)]
            .into_iter()
            .map(|(x, y)| TileCoord::new(x, y, 1))
            .collect();
        assert_eq!(keys, expected);

        let frame = map.frame();
        assert!(frame
            .tiles
            .iter()
            .all(|t| t.url.starts_with("https://tile.openstreetmap.org/1/")));
    }

    #[test]
    fn test_drag_through_bus() {
        println!("🧪 [TEST] drag through the event bus");

        let map = equator_map();
        let bus = EventBus::new();
        let _guard = map.mount(&bus);

        bus.dispatch(EventTarget::Container, &press(100.0, 100.0));
        assert!(map.is_dragging());

        let handled = bus.dispatch(EventTarget::Window, &move_to(110.0, 95.0));
        assert!(handled.is_handled());
        assert_eq!(map.viewport().pixel_center(), Point::new(246.0, 261.0));

        bus.dispatch(EventTarget::Window, &release());
        assert!(!map.is_dragging());

        // Moves after release no longer pan.
        bus.dispatch(EventTarget::Container, &move_to(300.0, 300.0));
        assert_eq!(map.viewport().pixel_center(), Point::new(246.0, 261.0));
    }

    #[test]
    fn test_press_outside_container_does_not_drag() {
        let map = equator_map();
        let bus = EventBus::new();
        let _guard = map.mount(&bus);

        assert_eq!(
            bus.dispatch(EventTarget::Window, &press(0.0, 0.0)),
            EventHandled::NotHandled
        );
        bus.dispatch(EventTarget::Window, &move_to(40.0, 40.0));
        assert!(!map.is_dragging());
        assert_eq!(map.viewport().pixel_center(), Point::new(256.0, 256.0));
    }

    #[test]
    fn test_wheel_scenarios() {
        println!("🧪 [TEST] wheel zoom clamps");

        let map = MapPlotBuilder::new().build().unwrap();
        let bus = EventBus::new();
        let _guard = map.mount(&bus);

        bus.dispatch(EventTarget::Container, &wheel(53.0));
        assert_eq!(map.viewport().zoom(), 3);

        for _ in 0..10 {
            bus.dispatch(EventTarget::Container, &wheel(53.0));
        }
        assert_eq!(map.viewport().zoom(), 1);

        map.set_zoom(19);
        bus.dispatch(EventTarget::Container, &wheel(-53.0));
        assert_eq!(map.viewport().zoom(), 19);

        // Wheel events outside the container are not the map's business.
        map.set_zoom(10);
        bus.dispatch(EventTarget::Window, &wheel(-53.0));
        assert_eq!(map.viewport().zoom(), 10);
    }

    #[test]
    fn test_zoom_after_drag_by_anchor() {
        println!("🧪 [TEST] zoom after drag, both anchors");

        let map = equator_map();
        map.handle_event(&press(0.0, 0.0));
        map.handle_event(&move_to(-64.0, -32.0));
        map.handle_event(&release());
        assert_eq!(map.viewport().pixel_center(), Point::new(320.0, 288.0));

        map.handle_event(&wheel(-1.0));
        assert_eq!(map.viewport().zoom(), 2);
        assert_eq!(map.viewport().pixel_center(), Point::new(640.0, 576.0));

        map.set_zoom_anchor(ZoomAnchor::LogicalCenter);
        map.handle_event(&wheel(-1.0));
        assert_eq!(map.viewport().zoom(), 3);
        assert_eq!(map.viewport().pixel_center(), Point::new(1024.0, 1024.0));
    }

    #[test]
    fn test_unmount_stops_input() {
        println!("🧪 [TEST] unmount releases listeners");

        let map = equator_map();
        let bus = EventBus::new();
        let guard = map.mount(&bus);

        bus.dispatch(EventTarget::Container, &press(0.0, 0.0));
        assert!(map.is_dragging());
        drop(guard);

        assert_eq!(bus.listener_count(), 0);
        assert!(!map.is_dragging());
        bus.dispatch(EventTarget::Window, &move_to(100.0, 0.0));
        bus.dispatch(EventTarget::Container, &wheel(1.0));
        assert_eq!(map.viewport().pixel_center(), Point::new(256.0, 256.0));
        assert_eq!(map.viewport().zoom(), 1);
    }

    #[test]
    fn test_unmount_from_inside_a_listener() {
        println!("🧪 [TEST] host unmounts the map while handling a release");

        let map = equator_map();
        let bus = EventBus::new();
        let mount: Rc<std::cell::RefCell<Option<MountGuard>>> = Rc::default();

        // The host's own release handler is registered before the map mounts,
        // so it runs first and tears the map down mid-dispatch.
        let slot = Rc::clone(&mount);
        bus.add_listener(EventTarget::Window, EventKind::Release, move |_| {
            slot.borrow_mut().take();
            EventHandled::Handled
        });
        *mount.borrow_mut() = Some(map.mount(&bus));
        assert_eq!(bus.listener_count(), 5);

        bus.dispatch(EventTarget::Container, &press(10.0, 10.0));
        bus.dispatch(EventTarget::Window, &move_to(20.0, 10.0));
        assert!(map.is_dragging());

        let handled = bus.dispatch(EventTarget::Window, &release());
        assert!(handled.is_handled());
        assert!(mount.borrow().is_none());
        assert_eq!(bus.listener_count(), 1);
        assert!(!map.is_dragging());

        bus.dispatch(EventTarget::Window, &move_to(200.0, 10.0));
        assert_eq!(map.viewport().pixel_center(), Point::new(246.0, 256.0));
    }

    #[test]
    fn test_remount_and_shared_bus() {
        let first = equator_map();
        let second = MapPlotBuilder::new().build().unwrap();
        let bus = EventBus::new();

        let first_guard = first.mount(&bus);
        let _second_guard = second.mount(&bus);
        assert_eq!(bus.listener_count(), 8);

        bus.dispatch(EventTarget::Container, &wheel(-1.0));
        assert_eq!(first.viewport().zoom(), 2);
        assert_eq!(second.viewport().zoom(), 5);

        drop(first_guard);
        assert_eq!(bus.listener_count(), 4);
        bus.dispatch(EventTarget::Container, &wheel(-1.0));
        assert_eq!(first.viewport().zoom(), 2);
        assert_eq!(second.viewport().zoom(), 6);

        let _again = first.mount(&bus);
        assert_eq!(bus.listener_count(), 8);
    }

    #[test]
    fn test_config_file_round_trip() {
        let path = std::env::temp_dir().join(format!("mapplot-config-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{
                "center": [51.5074, -0.1278],
                "zoom": 30,
                "width": 640,
                "height": 480,
                "points": [ { "lat": 51.5, "lon": -0.12, "label": "Westminster" } ]
            }"#,
        )
        .unwrap();

        let config = MapPlotConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.zoom, 19);

        let map = MapPlot::new(config).unwrap();
        let frame = map.frame();
        assert_eq!((frame.width, frame.height), (640.0, 480.0));
        assert_eq!(frame.markers.len(), 1);
        assert_eq!(frame.markers[0].label.as_deref(), Some("Westminster"));
    }

    #[test]
    fn test_frame_serializes() {
        let frame = equator_map().frame();
        let json = serde_json::to_string(&frame).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tiles.len(), frame.tiles.len());
        assert_eq!(back.zoom, 1);
    }
}
