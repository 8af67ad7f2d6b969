//! End-to-end layout scenarios driven through the public `Engine` API.

use std::cell::RefCell;
use std::rc::Rc;

use plinth::{
    Alignment, Clip, Color, Declaration, DiagnosticKind, Direction, ElementId, Engine, Padding, Point, Rect,
    RenderCommand, RenderCommandKind, Size, Sizing, TextStyle,
};

const COLOR_LIGHT: (u8, u8, u8) = (224, 215, 210);
const COLOR_RED: (u8, u8, u8) = (168, 66, 28);
const COLOR_ORANGE: (u8, u8, u8) = (225, 138, 50);

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::rgb8(r, g, b)
}

type Seen = Rc<RefCell<Vec<DiagnosticKind>>>;

fn engine_with(arena_bytes: usize) -> (Engine, Seen) {
    let seen: Seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let engine = Engine::initialize(arena_bytes, Size::new(800.0, 600.0), move |d| sink.borrow_mut().push(d.kind))
        .expect("engine");
    (engine, seen)
}

fn engine() -> (Engine, Seen) {
    engine_with(Engine::min_memory_size() * 64)
}

/// 10px per byte, 20px per line.
fn fixed_measurer(text: &str, _font: u16, _size: f32) -> Size {
    Size::new(text.len() as f32 * 10.0, 20.0)
}

fn sidebar_frame(ui: &mut Engine) {
    ui.element(
        Declaration::new()
            .id("OuterContainer")
            .size(Sizing::grow(), Sizing::grow())
            .padding(Padding::all(16.0))
            .child_gap(16.0)
            .background(Color::rgb8(250, 250, 255)),
        |ui| {
            ui.element(
                Declaration::new()
                    .id("SideBar")
                    .size(Sizing::fixed(300.0), Sizing::grow())
                    .direction(Direction::TopToBottom)
                    .padding(Padding::all(16.0))
                    .child_gap(16.0)
                    .background(rgb(COLOR_LIGHT)),
                |ui| {
                    ui.element(
                        Declaration::new()
                            .id("ProfilePictureOuter")
                            .width(Sizing::grow())
                            .padding(Padding::all(16.0))
                            .child_gap(16.0)
                            .align(Alignment::Start, Alignment::Center)
                            .background(rgb(COLOR_RED)),
                        |ui| ui.text("Clay - UI Library", TextStyle::new().size(24.0).color(Color::WHITE)),
                    );
                    for i in 0..5 {
                        ui.element(
                            Declaration::new()
                                .id(ElementId::indexed("SidebarItem", i))
                                .size(Sizing::grow(), Sizing::fixed(50.0))
                                .background(rgb(COLOR_ORANGE)),
                            |_| {},
                        );
                    }
                },
            );
            ui.element(
                Declaration::new()
                    .id("MainContent")
                    .size(Sizing::grow(), Sizing::grow())
                    .background(rgb(COLOR_LIGHT)),
                |_| {},
            );
        },
    );
}

fn collect(engine: &mut Engine) -> (Vec<RenderCommand>, Vec<String>) {
    let commands = engine.end_frame();
    let text = commands.iter().filter_map(|c| commands.text_of(c)).map(str::to_owned).collect();
    (commands.iter().copied().collect(), text)
}

// =========================================================================
// Sizing properties
// =========================================================================

#[test]
fn sidebar_scenario_boxes() {
    let (mut engine, seen) = engine();
    engine.begin_frame();
    sidebar_frame(&mut engine);
    let commands = engine.end_frame();
    assert!(!commands.is_empty());
    assert!(seen.borrow().is_empty());

    assert_eq!(engine.element_box("OuterContainer"), Some(Rect::new(0.0, 0.0, 800.0, 600.0)));
    assert_eq!(engine.element_box("SideBar"), Some(Rect::new(16.0, 16.0, 300.0, 568.0)));
    // 800 - 2 * 16 padding - 300 sidebar - 16 gap
    assert_eq!(engine.element_box("MainContent"), Some(Rect::new(332.0, 16.0, 452.0, 568.0)));

    let profile = engine.element_box("ProfilePictureOuter").unwrap();
    assert_eq!(profile.width, 268.0);
    let first = engine.element_box(ElementId::indexed("SidebarItem", 0)).unwrap();
    let second = engine.element_box(ElementId::indexed("SidebarItem", 1)).unwrap();
    assert_eq!(first.width, 268.0);
    assert_eq!(first.height, 50.0);
    assert_eq!(second.y - first.y, 66.0);
    assert!((first.y - (profile.y + profile.height + 16.0)).abs() < 1e-3);
}

#[test]
fn sidebar_title_wraps_to_fit() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    sidebar_frame(&mut engine);
    let (_, lines) = collect(&mut engine);
    assert_eq!(lines, vec!["Clay - UI", "Library"]);
}

#[test]
fn fixed_children_with_gap_fit_parent() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    engine.element(
        Declaration::new()
            .id("column")
            .direction(Direction::TopToBottom)
            .padding(Padding::all(16.0))
            .child_gap(16.0),
        |ui| {
            for i in 0..5 {
                ui.element(
                    Declaration::new()
                        .id(ElementId::indexed("item", i))
                        .size(Sizing::fixed(100.0), Sizing::fixed(50.0)),
                    |_| {},
                );
            }
        },
    );
    engine.end_frame();
    let column = engine.element_box("column").unwrap();
    assert_eq!(column.height, 314.0 + 32.0);
    assert_eq!(column.width, 132.0);
}

#[test]
fn grow_children_with_fixed_height_stack_with_gaps() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    engine.element(
        Declaration::new()
            .id("column")
            .size(Sizing::fixed(200.0), Sizing::fit())
            .direction(Direction::TopToBottom)
            .padding(Padding::all(16.0))
            .child_gap(16.0),
        |ui| {
            for i in 0..5 {
                ui.element(
                    Declaration::new()
                        .id(ElementId::indexed("item", i))
                        .size(Sizing::grow(), Sizing::fixed(50.0)),
                    |_| {},
                );
            }
        },
    );
    engine.end_frame();

    let column = engine.element_box("column").unwrap();
    assert_eq!(column.height, 314.0 + 32.0);
    let last = engine.element_box(ElementId::indexed("item", 4)).unwrap();
    assert_eq!(last, Rect::new(16.0, 16.0 + 4.0 * 66.0, 168.0, 50.0));
}

#[test]
fn fixed_sizes_are_exact() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    engine.element(Declaration::new().width(Sizing::fixed(10.0)), |ui| {
        ui.element(Declaration::new().id("big").size(Sizing::fixed(123.5), Sizing::fixed(77.25)), |_| {});
    });
    engine.end_frame();
    let big = engine.element_box("big").unwrap();
    assert_eq!((big.width, big.height), (123.5, 77.25));
}

#[test]
fn grow_children_split_evenly() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    engine.element(Declaration::new().width(Sizing::fixed(300.0)), |ui| {
        ui.element(Declaration::new().id("a").width(Sizing::grow()), |_| {});
        ui.element(Declaration::new().id("b").width(Sizing::grow()), |_| {});
    });
    engine.end_frame();
    assert_eq!(engine.element_box("a").unwrap().width, 150.0);
    assert_eq!(engine.element_box("b").unwrap().width, 150.0);
}

#[test]
fn percent_of_content_box() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    engine.element(Declaration::new().width(Sizing::fixed(400.0)), |ui| {
        ui.element(Declaration::new().id("half").width(Sizing::percent(0.5)), |_| {});
    });
    engine.end_frame();
    assert_eq!(engine.element_box("half").unwrap().width, 200.0);
}

#[test]
fn main_axis_children_fit_content_box() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    engine.element(
        Declaration::new()
            .id("row")
            .width(Sizing::fixed(500.0))
            .padding(Padding::all(10.0))
            .child_gap(10.0),
        |ui| {
            ui.element(Declaration::new().id("fixed").width(Sizing::fixed(100.0)), |_| {});
            ui.element(Declaration::new().id("grow").width(Sizing::grow()), |_| {});
            ui.element(Declaration::new().id("capped").width(Sizing::grow().max(50.0)), |_| {});
            ui.element(Declaration::new().id("pct").width(Sizing::percent(0.2)), |_| {});
        },
    );
    engine.end_frame();

    let widths: f32 = ["fixed", "grow", "capped", "pct"]
        .iter()
        .map(|id| engine.element_box(*id).unwrap().width)
        .sum();
    assert!(widths + 30.0 <= 480.0 + 1e-3);
    assert_eq!(engine.element_box("capped").unwrap().width, 50.0);
    assert_eq!(engine.element_box("pct").unwrap().width, 96.0);
    assert_eq!(engine.element_box("grow").unwrap().width, 204.0);
}

#[test]
fn grow_minimum_takes_priority_in_redistribution() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    engine.element(Declaration::new().width(Sizing::fixed(300.0)), |ui| {
        ui.element(Declaration::new().id("a").width(Sizing::grow().min(200.0)), |_| {});
        ui.element(Declaration::new().id("b").width(Sizing::grow()), |_| {});
    });
    engine.end_frame();
    let (a, b) = (engine.element_box("a").unwrap(), engine.element_box("b").unwrap());
    assert_eq!((a.width, b.width), (200.0, 100.0));
    assert_eq!(b.x, 200.0);
}

#[test]
fn minimums_win_over_parent_size() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    engine.element(Declaration::new().width(Sizing::fixed(100.0)), |ui| {
        ui.element(Declaration::new().id("a").width(Sizing::grow().min(80.0)), |_| {});
        ui.element(Declaration::new().id("b").width(Sizing::grow().min(80.0)), |_| {});
    });
    engine.end_frame();
    assert_eq!(engine.element_box("a").unwrap().width, 80.0);
    assert_eq!(engine.element_box("b").unwrap().x, 80.0);
}

// =========================================================================
// Output properties
// =========================================================================

#[test]
fn rebuilding_the_same_tree_is_idempotent() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    sidebar_frame(&mut engine);
    let first = collect(&mut engine);
    engine.begin_frame();
    sidebar_frame(&mut engine);
    let second = collect(&mut engine);
    assert_eq!(first, second);
}

#[test]
fn parent_background_precedes_children() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    sidebar_frame(&mut engine);
    let (commands, _) = collect(&mut engine);

    let index_of = |id: ElementId| commands.iter().position(|c| c.id == id).unwrap();
    let outer = index_of(ElementId::named("OuterContainer"));
    let sidebar = index_of(ElementId::named("SideBar"));
    let item = index_of(ElementId::indexed("SidebarItem", 0));
    assert!(outer < sidebar);
    assert!(sidebar < item);
    assert_eq!(commands[outer].kind(), RenderCommandKind::Rectangle);
}

#[test]
fn scissors_are_balanced_and_nested() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    engine.element(Declaration::new().id("outer").clip(Clip::BOTH), |ui| {
        ui.element(Declaration::new().id("inner").clip(Clip::BOTH), |ui| {
            ui.element(Declaration::new().background(Color::BLACK).size(Sizing::fixed(5.0), Sizing::fixed(5.0)), |_| {});
        });
        ui.element(Declaration::new().id("after").background(Color::WHITE), |_| {});
    });
    let (commands, _) = collect(&mut engine);

    let mut open = Vec::new();
    for command in &commands {
        match command.kind() {
            RenderCommandKind::ScissorStart => open.push(command.id),
            RenderCommandKind::ScissorEnd => assert_eq!(open.pop(), Some(command.id)),
            _ => {}
        }
    }
    assert!(open.is_empty());

    let after = commands.iter().position(|c| c.id == ElementId::named("after")).unwrap();
    let inner_end = commands
        .iter()
        .position(|c| c.id == ElementId::named("inner") && c.kind() == RenderCommandKind::ScissorEnd)
        .unwrap();
    assert!(inner_end < after);
}

#[test]
fn wrapped_text_adds_lines_and_height() {
    let (mut engine, _) = engine();
    engine.set_text_measurer(fixed_measurer);
    engine.begin_frame();
    engine.element(Declaration::new().id("box").width(Sizing::fixed(80.0)), |ui| {
        ui.text("one two three", TextStyle::new());
    });
    let (commands, lines) = collect(&mut engine);
    assert_eq!(lines, vec!["one two", "three"]);
    let text: Vec<_> = commands.iter().filter(|c| c.kind() == RenderCommandKind::Text).collect();
    assert_eq!(text[1].bounding_box.y - text[0].bounding_box.y, 20.0);
    assert_eq!(engine.element_box("box").unwrap().height, 40.0);
}

// =========================================================================
// Diagnostics
// =========================================================================

#[test]
fn unbalanced_frame_reports_once_and_emits_nothing() {
    let (mut engine, seen) = engine();
    engine.begin_frame();
    sidebar_frame(&mut engine);
    assert!(!engine.end_frame().is_empty());

    engine.begin_frame();
    engine.open(Declaration::new().background(Color::WHITE));
    engine.open(Declaration::new().background(Color::WHITE));
    engine.open(Declaration::new().background(Color::WHITE));
    engine.close();
    engine.close();
    assert!(engine.end_frame().is_empty());
    assert_eq!(*seen.borrow(), vec![DiagnosticKind::MismatchedScope]);
    assert!(engine.frame_stats().abandoned);
}

#[test]
fn exhausted_arena_returns_previous_output() {
    let (mut engine, seen) = engine_with(Engine::min_memory_size());
    engine.begin_frame();
    engine.element(Declaration::new().id("only").background(Color::WHITE), |_| {});
    let (good, _) = collect(&mut engine);
    assert_eq!(good.len(), 1);

    engine.begin_frame();
    engine.element(Declaration::new().id("big"), |ui| {
        for i in 0..10_000 {
            ui.element(Declaration::new().id(ElementId::indexed("cell", i)).background(Color::BLACK), |_| {});
        }
    });
    let (stale, _) = collect(&mut engine);
    assert_eq!(stale, good);
    assert_eq!(*seen.borrow(), vec![DiagnosticKind::OutOfMemory]);

    // The next frame starts clean.
    engine.begin_frame();
    engine.element(Declaration::new().id("again").background(Color::WHITE), |_| {});
    let (fresh, _) = collect(&mut engine);
    assert_eq!(fresh[0].id, ElementId::named("again"));
}

#[test]
fn invalid_values_are_corrected() {
    let (mut engine, seen) = engine();
    engine.begin_frame();
    engine.element(Declaration::new().width(Sizing::fixed(200.0)), |ui| {
        ui.element(
            Declaration::new()
                .id("bad")
                .width(Sizing::grow().min(50.0).max(10.0))
                .padding(Padding::all(-4.0)),
            |_| {},
        );
    });
    engine.end_frame();
    assert_eq!(*seen.borrow(), vec![DiagnosticKind::InvalidSizingConfig]);
    assert_eq!(engine.element_box("bad").unwrap().width, 50.0);
}

// =========================================================================
// Queries
// =========================================================================

#[test]
fn hit_testing_finds_deepest_element() {
    let (mut engine, _) = engine();
    engine.begin_frame();
    sidebar_frame(&mut engine);
    engine.end_frame();

    assert_eq!(engine.element_at(Point::new(500.0, 300.0)), Some(ElementId::named("MainContent")));
    let item = engine.element_box(ElementId::indexed("SidebarItem", 2)).unwrap();
    let inside = Point::new(item.x + 1.0, item.y + 1.0);
    assert_eq!(engine.element_at(inside), Some(ElementId::indexed("SidebarItem", 2)));
    assert!(engine.pointer_over("SideBar", inside));
    assert_eq!(engine.element_at(Point::new(4.0, 4.0)), Some(ElementId::named("OuterContainer")));
}

#[test]
fn scrolling_offsets_clipped_children() {
    let (mut engine, _) = engine();
    let frame = |ui: &mut Engine| {
        ui.element(
            Declaration::new()
                .id("list")
                .size(Sizing::fixed(100.0), Sizing::fixed(100.0))
                .direction(Direction::TopToBottom)
                .clip(Clip { horizontal: false, vertical: true }),
            |ui| {
                for i in 0..4 {
                    ui.element(
                        Declaration::new()
                            .id(ElementId::indexed("row", i))
                            .size(Sizing::grow(), Sizing::fixed(50.0)),
                        |_| {},
                    );
                }
            },
        );
    };

    engine.begin_frame();
    frame(&mut engine);
    engine.end_frame();
    assert_eq!(engine.element_box(ElementId::indexed("row", 0)).unwrap().y, 0.0);

    engine.scroll_by("list", Point::new(0.0, -500.0));
    assert_eq!(engine.scroll_offset("list"), Point::new(0.0, 100.0));

    engine.begin_frame();
    frame(&mut engine);
    engine.end_frame();
    assert_eq!(engine.element_box(ElementId::indexed("row", 0)).unwrap().y, -100.0);
    assert_eq!(engine.element_at(Point::new(10.0, 10.0)), Some(ElementId::indexed("row", 2)));
}

#[test]
fn duplicate_ids_are_reported_but_laid_out() {
    let (mut engine, seen) = engine();
    engine.begin_frame();
    engine.element(Declaration::new(), |ui| {
        ui.element(Declaration::new().id("twin").background(Color::WHITE), |_| {});
        ui.element(Declaration::new().id("twin").background(Color::WHITE), |_| {});
    });
    assert_eq!(engine.end_frame().len(), 2);
    assert_eq!(*seen.borrow(), vec![DiagnosticKind::DuplicateId]);
}
