//! Argument snapshot expressions built for injected tracker calls

use proc_macro2::Span;
use quote::quote;
use syn::{parse_quote, Expr, Ident, Path};

use crate::analysis::{FunctionInfo, Param, TypeShape};

const ARGUMENTS_BINDING: &str = "__recomp_arguments";

/// Parameters captured into the snapshot: identifier bindings other than the host
pub fn captured_params<'a>(info: &'a FunctionInfo, host: &Ident) -> Vec<&'a Param> {
    info.declaration
        .params
        .iter()
        .filter(|param| param.binding && *host != param.name)
        .collect()
}

/// Expression of type `&Arguments` for the tracker call.
///
/// Values go through `Capture`, so parameters without a `Debug` rendering
/// (closures, unbounded generics) are recorded by type name.
pub fn arguments_expr(runtime: &Path, params: &[&Param]) -> Expr {
    if params.is_empty() {
        return parse_quote!(&#runtime::EMPTY_ARGUMENTS);
    }

    let binding = Ident::new(ARGUMENTS_BINDING, Span::call_site());
    let capacity = params.len();
    let pushes = params.iter().map(|param| {
        let value = binding_ident(&param.name);
        let name = param.name.trim_start_matches("r#");
        let captured = match param.shape {
            TypeShape::Plain => quote! {
                ::core::option::Option::Some((&&#runtime::Capture(&#value)).capture_value())
            },
            TypeShape::Reactive => quote! {
                ::core::option::Option::Some(
                    #runtime::Reactive::with_current(&#value, |current| {
                        (&&#runtime::Capture(current)).capture_value()
                    })
                    .into_reactive()
                )
            },
            TypeShape::Optional => quote! {
                #value.as_ref().map(|current| (&&#runtime::Capture(current)).capture_value())
            },
        };
        quote!(#binding.push_captured(#name, #captured);)
    });

    parse_quote! {
        &{
            #[allow(unused_imports)]
            use #runtime::{CaptureDebug as _, CaptureOpaque as _};
            let mut #binding = #runtime::Arguments::with_capacity(#capacity);
            #(#pushes)*
            #binding
        }
    }
}

fn binding_ident(name: &str) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(name, Span::call_site()),
    }
}

/// `&[..]` listing the skipped parameter names, sorted
pub fn skipped_expr(info: &FunctionInfo) -> Expr {
    let names = info.skip.skipped_parameter_names.iter();
    parse_quote!(&[#(#names),*])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analysis;
    use crate::options::InstrumentOptions;
    use quote::ToTokens;

    fn first_info(source: &str) -> FunctionInfo {
        let file = syn::parse_file(source).unwrap();
        let analysis = Analysis::run(&file, &InstrumentOptions::default());
        analysis.functions()[0].clone()
    }

    fn tokens(expr: &Expr) -> String {
        expr.to_token_stream().to_string()
    }

    #[test]
    fn test_zero_parameters_use_shared_constant() {
        let info = first_info("#[component] fn logo(cx: &mut Host) {}");
        let host: Ident = parse_quote!(cx);
        let runtime: Path = parse_quote!(::recomp_tracker::runtime);
        let params = captured_params(&info, &host);
        assert!(params.is_empty());
        assert_eq!(
            tokens(&arguments_expr(&runtime, &params)),
            "& :: recomp_tracker :: runtime :: EMPTY_ARGUMENTS"
        );
    }

    #[test]
    fn test_capture_follows_type_shape() {
        let info = first_info(
            "#[component] fn field(cx: &mut Host, label: &str, value: &State<String>, hint: Option<String>, (a, b): (u8, u8)) {}",
        );
        let host: Ident = parse_quote!(cx);
        let runtime: Path = parse_quote!(rt);
        let params = captured_params(&info, &host);
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["label", "value", "hint"]);

        let text = tokens(&arguments_expr(&runtime, &params));
        assert!(text.contains("use rt :: { CaptureDebug as _ , CaptureOpaque as _ }"));
        assert!(text.contains("rt :: Arguments :: with_capacity (3usize)"));
        assert!(text.contains("push_captured (\"label\" , :: core :: option :: Option :: Some"));
        assert!(text.contains("rt :: Capture (& label)) . capture_value ()"));
        assert!(text.contains("rt :: Reactive :: with_current (& value , | current |"));
        assert!(text.contains(". into_reactive ()"));
        assert!(text.contains("push_captured (\"hint\" , hint . as_ref () . map (| current |"));
        assert!(!text.contains("(& a)"));
    }

    #[test]
    fn test_skipped_names_are_sorted() {
        let info = first_info(
            "#[component] fn row(#[skip_recomposition_tracking] z: u8, #[skip_recomposition_tracking] a: u8) {}",
        );
        assert_eq!(tokens(&skipped_expr(&info)), "& [\"a\" , \"z\"]");
    }
}
