use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ItemFn;

/// Proc macro to denote a Transaction
///
/// The function must be `async` and return a `Result<T, E>`. Every call is counted as a success
/// or an error of the running Scenario, and with the `metrics` feature the `<name>_success`,
/// `<name>_error` counters and the `<name>_latency` histogram are recorded.
///
/// # Example
/// ```ignore
/// use ipswarm::prelude::*;
///
/// #[transaction]
/// async fn my_transaction(arg_1: u32, arg_2: &str) -> Result<String, MyError> {
///     ...
/// }
/// ```
#[proc_macro_attribute]
pub fn transaction(attr: TokenStream, item: TokenStream) -> TokenStream {
    match syn::parse::<ItemFn>(item) {
        Ok(input) => transaction_internal(attr.into(), input).into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn transaction_internal(_attr: TokenStream2, input: ItemFn) -> TokenStream2 {
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input;

    if sig.asyncness.is_none() {
        return syn::Error::new_spanned(sig.fn_token, "#[transaction] requires an async fn")
            .to_compile_error();
    }

    let stmts = &block.stmts;
    let name = sig.ident.to_string();
    let success = format!("{name}_success");
    let error = format!("{name}_error");
    let latency = format!("{name}_latency");

    quote! {
        #(#attrs)* #vis #sig {
            ::ipswarm::transaction::transaction_hook(
                ::ipswarm::transaction::TransactionLabels {
                    success: #success,
                    error: #error,
                    latency: #latency,
                },
                async move {
                    #(#stmts)*
                },
            )
            .await
        }
    }
}
