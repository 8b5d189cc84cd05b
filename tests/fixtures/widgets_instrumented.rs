use std::fmt::Display;

use recomp_tracker::runtime::{CompositionHost, State};

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub dark: bool,
}

pub fn screen<H: CompositionHost>(cx: &mut H, title: &str, draft: &State<String>, theme: Option<Theme>) {
    ::recomp_tracker::runtime::recomposition_tracker(
        cx,
        "screen",
        &{
            #[allow(unused_imports)]
            use ::recomp_tracker::runtime::{CaptureDebug as _, CaptureOpaque as _};
            let mut __recomp_arguments = ::recomp_tracker::runtime::Arguments::with_capacity(3usize);
            __recomp_arguments.push_captured(
                "title",
                ::core::option::Option::Some((&&::recomp_tracker::runtime::Capture(&title)).capture_value())
            );
            __recomp_arguments.push_captured(
                "draft",
                ::core::option::Option::Some(
                    ::recomp_tracker::runtime::Reactive::with_current(&draft, |current| {
                        (&&::recomp_tracker::runtime::Capture(current)).capture_value()
                    })
                    .into_reactive()
                )
            );
            __recomp_arguments.push_captured(
                "theme",
                theme
                    .as_ref()
                    .map(|current| (&&::recomp_tracker::runtime::Capture(current)).capture_value())
            );
            __recomp_arguments
        },
        &[]
    );
    header(cx, title, draft.with(|text| text.len()));
    list(cx, 2, |cx: &mut H, index: usize| {
        ::recomp_tracker::runtime::recomposition_tracker(
            cx,
            "<unit>.screen::{closure#1}",
            &{
                #[allow(unused_imports)]
                use ::recomp_tracker::runtime::{CaptureDebug as _, CaptureOpaque as _};
                let mut __recomp_arguments = ::recomp_tracker::runtime::Arguments::with_capacity(1usize);
                __recomp_arguments.push_captured(
                    "index",
                    ::core::option::Option::Some((&&::recomp_tracker::runtime::Capture(&index)).capture_value())
                );
                __recomp_arguments
            },
            &[]
        );
        row(cx, index)
    });
    badge(cx, "new", None);
}

pub fn header<H: CompositionHost>(cx: &mut H, title: &str, length: usize) {
    ::recomp_tracker::runtime::recomposition_tracker(
        cx,
        "header",
        &{
            #[allow(unused_imports)]
            use ::recomp_tracker::runtime::{CaptureDebug as _, CaptureOpaque as _};
            let mut __recomp_arguments = ::recomp_tracker::runtime::Arguments::with_capacity(2usize);
            __recomp_arguments.push_captured(
                "title",
                ::core::option::Option::Some((&&::recomp_tracker::runtime::Capture(&title)).capture_value())
            );
            __recomp_arguments.push_captured(
                "length",
                ::core::option::Option::Some((&&::recomp_tracker::runtime::Capture(&length)).capture_value())
            );
            __recomp_arguments
        },
        &[]
    );
}

pub fn list<H: CompositionHost>(cx: &mut H, count: usize, item: impl Fn(&mut H, usize)) {
    ::recomp_tracker::runtime::recomposition_tracker(
        cx,
        "list",
        &{
            #[allow(unused_imports)]
            use ::recomp_tracker::runtime::{CaptureDebug as _, CaptureOpaque as _};
            let mut __recomp_arguments = ::recomp_tracker::runtime::Arguments::with_capacity(2usize);
            __recomp_arguments.push_captured(
                "count",
                ::core::option::Option::Some((&&::recomp_tracker::runtime::Capture(&count)).capture_value())
            );
            __recomp_arguments.push_captured(
                "item",
                ::core::option::Option::Some((&&::recomp_tracker::runtime::Capture(&item)).capture_value())
            );
            __recomp_arguments
        },
        &[]
    );
    for index in 0..count {
        item(&mut *cx, index);
    }
}

pub fn row<H: CompositionHost>(cx: &mut H, index: usize) {
    ::recomp_tracker::runtime::recomposition_tracker(
        cx,
        "row",
        &{
            #[allow(unused_imports)]
            use ::recomp_tracker::runtime::{CaptureDebug as _, CaptureOpaque as _};
            let mut __recomp_arguments = ::recomp_tracker::runtime::Arguments::with_capacity(1usize);
            __recomp_arguments.push_captured(
                "index",
                ::core::option::Option::Some((&&::recomp_tracker::runtime::Capture(&index)).capture_value())
            );
            __recomp_arguments
        },
        &[]
    );
}

pub fn badge<H: CompositionHost, T: Display>(
    cx: &mut H,
    label: T,
    on_click: Option<Box<dyn Fn()>>,
) {
    ::recomp_tracker::runtime::recomposition_tracker(
        cx,
        "badge",
        &{
            #[allow(unused_imports)]
            use ::recomp_tracker::runtime::{CaptureDebug as _, CaptureOpaque as _};
            let mut __recomp_arguments = ::recomp_tracker::runtime::Arguments::with_capacity(2usize);
            __recomp_arguments.push_captured(
                "label",
                ::core::option::Option::Some((&&::recomp_tracker::runtime::Capture(&label)).capture_value())
            );
            __recomp_arguments.push_captured(
                "on_click",
                on_click
                    .as_ref()
                    .map(|current| (&&::recomp_tracker::runtime::Capture(current)).capture_value())
            );
            __recomp_arguments
        },
        &["on_click"]
    );
}
