use quote::{format_ident, quote};
use syn::{parse_macro_input, LitStr};

/// Generates one `#[test]` per `.lox` script found below the given directory
/// (relative to `bin/tests`). Each test feeds the script's source to `lox_expect`.
#[proc_macro]
pub fn generate_tests(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let scripts_dir = parse_macro_input!(input as LitStr).value();
    let tests_dir = format!("{}/..", env!("CARGO_MANIFEST_DIR"));

    let scripts = walkdir::WalkDir::new(format!("{tests_dir}/{scripts_dir}"));
    let tests: Vec<proc_macro2::TokenStream> = scripts
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .filter(|entry| entry.path().extension() == Some("lox".as_ref()))
        .map(|entry| {
            let script_path = entry.path().to_string_lossy().to_string();
            let relative_path = entry.path().strip_prefix(&tests_dir).unwrap().with_extension("");
            let test_ident = format_ident!(
                "test_{}",
                relative_path.to_string_lossy().replace(['/', '-', '.'], "_")
            );
            quote! {
                #[test]
                fn #test_ident() {
                    lox_expect(include_str!(#script_path));
                }
            }
        })
        .collect();

    quote! {
        #[ctor::ctor]
        fn init() {
            let _ = env_logger::builder().is_test(true).try_init();
        }

        #(#tests)*
    }
    .into()
}
