//! The sample sidebar layout.

use plinth::{Alignment, Color, Declaration, Direction, ElementId, Engine, Padding, Sizing, TextStyle};

pub const SIDEBAR_ITEMS: u32 = 5;

const BACKGROUND: Color = Color::rgb(250.0 / 255.0, 250.0 / 255.0, 1.0);
const LIGHT: Color = Color::rgb(224.0 / 255.0, 215.0 / 255.0, 210.0 / 255.0);
const RED: Color = Color::rgb(168.0 / 255.0, 66.0 / 255.0, 28.0 / 255.0);
const ORANGE: Color = Color::rgb(225.0 / 255.0, 138.0 / 255.0, 50.0 / 255.0);

/// Declare one frame: a fixed-width sidebar with a title and a stack of
/// items, next to a main panel that takes the remaining width.
pub fn declare(ui: &mut Engine, title: &str) {
    ui.element(
        Declaration::new()
            .id("OuterContainer")
            .size(Sizing::grow(), Sizing::grow())
            .padding(Padding::all(16.0))
            .child_gap(16.0)
            .background(BACKGROUND),
        |ui| {
            ui.element(
                Declaration::new()
                    .id("SideBar")
                    .size(Sizing::fixed(300.0), Sizing::grow())
                    .direction(Direction::TopToBottom)
                    .padding(Padding::all(16.0))
                    .child_gap(16.0)
                    .background(LIGHT),
                |ui| {
                    ui.element(
                        Declaration::new()
                            .id("ProfilePictureOuter")
                            .width(Sizing::grow())
                            .padding(Padding::all(16.0))
                            .child_gap(16.0)
                            .align(Alignment::Start, Alignment::Center)
                            .background(RED),
                        |ui| ui.text(title, TextStyle::new().size(24.0).color(Color::WHITE)),
                    );
                    for i in 0..SIDEBAR_ITEMS {
                        ui.element(
                            Declaration::new()
                                .id(ElementId::indexed("SidebarItem", i))
                                .size(Sizing::grow(), Sizing::fixed(50.0))
                                .background(ORANGE),
                            |_| {},
                        );
                    }
                },
            );
            ui.element(
                Declaration::new()
                    .id("MainContent")
                    .size(Sizing::grow(), Sizing::grow())
                    .background(LIGHT),
                |_| {},
            );
        },
    );
}
