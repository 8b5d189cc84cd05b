use std::fmt::Display;

use recomp_tracker::runtime::{CompositionHost, State};

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub dark: bool,
}

#[component]
#[track_recompositions(include_nested = true)]
pub fn screen<H: CompositionHost>(cx: &mut H, title: &str, draft: &State<String>, theme: Option<Theme>) {
    header(cx, title, draft.with(|text| text.len()));
    list(cx, 2, #[component] |cx: &mut H, index: usize| row(cx, index));
    badge(cx, "new", None);
}

#[component]
pub fn header<H: CompositionHost>(cx: &mut H, title: &str, length: usize) {}

#[component]
pub fn list<H: CompositionHost>(cx: &mut H, count: usize, item: impl Fn(&mut H, usize)) {
    for index in 0..count {
        item(&mut *cx, index);
    }
}

#[component]
pub fn row<H: CompositionHost>(cx: &mut H, index: usize) {}

#[component]
#[track_recompositions]
pub fn badge<H: CompositionHost, T: Display>(
    cx: &mut H,
    label: T,
    #[skip_recomposition_tracking] on_click: Option<Box<dyn Fn()>>,
) {
}
