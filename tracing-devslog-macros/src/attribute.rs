use crate::AttributeArgs;
use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::parse::Parser;

fn token_stream_to_compile_err(mut tokens: TokenStream, err: syn::Error) -> TokenStream {
    tokens.extend(TokenStream::from(err.into_compile_error()));
    tokens
}

pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input: syn::ItemFn = match syn::parse(item.clone()) {
        Ok(input) => input,
        Err(e) => return token_stream_to_compile_err(item, e),
    };

    impl_attribute(input, args, false).unwrap_or_else(|e| token_stream_to_compile_err(item, e))
}

pub fn test(args: TokenStream, item: TokenStream) -> TokenStream {
    let input: syn::ItemFn = match syn::parse(item.clone()) {
        Ok(input) => input,
        Err(e) => return token_stream_to_compile_err(item, e),
    };

    if let Some(attr) = input.attrs.iter().find(|attr| attr.path.is_ident("test")) {
        let msg = "Second #[test] attribute is supplied";
        return token_stream_to_compile_err(item, syn::Error::new_spanned(&attr, msg));
    }

    impl_attribute(input, args, true).unwrap_or_else(|e| token_stream_to_compile_err(item, e))
}

/// Returns `true` for `#[tokio::test]` in tests and `#[tokio::main]` otherwise.
fn is_tokio_attribute(attr: &syn::Attribute, is_test: bool) -> bool {
    let expected = if is_test { "test" } else { "main" };
    let segments: Vec<String> = attr
        .path
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect();

    segments == ["tokio", expected]
}

fn impl_attribute(
    input: syn::ItemFn,
    args: TokenStream,
    is_test: bool,
) -> syn::Result<TokenStream> {
    if !input.sig.inputs.is_empty() {
        let msg = "Cannot accept arguments";
        return Err(syn::Error::new_spanned(&input.sig.ident, msg));
    }

    let args = AttributeArgs::parse_terminated.parse(args)?;
    let config = Config::parse(args, is_test)?;

    match input.sig.asyncness {
        Some(asyncness) => {
            if !input
                .attrs
                .iter()
                .any(|attr| is_tokio_attribute(attr, is_test))
            {
                let msg = if is_test {
                    "Attribute must be succeeded by #[tokio::test] for async tests"
                } else {
                    "Attribute must be succeeded by #[tokio::main] for async functions"
                };
                return Err(syn::Error::new_spanned(asyncness, msg));
            }

            impl_async(config, input)
        }
        None => impl_sync(config, input),
    }
}

fn impl_async(config: Config, mut input: syn::ItemFn) -> syn::Result<TokenStream> {
    let builder = config.builder();

    let brace_token = input.block.brace_token;
    let block = input.block;
    input.block = syn::parse2(quote! {
        {
            #builder.on_future(async #block).await
        }
    })?;
    input.block.brace_token = brace_token;

    Ok(quote! { #input }.into())
}

fn impl_sync(config: Config, mut input: syn::ItemFn) -> syn::Result<TokenStream> {
    let header = if config.is_test {
        quote! { #[::core::prelude::v1::test] }
    } else {
        quote! {}
    };

    let builder = config.builder();

    let brace_token = input.block.brace_token;
    let block = input.block;
    input.block = syn::parse2(quote! {
        {
            #builder.on_closure(|| #block)
        }
    })?;
    input.block.brace_token = brace_token;

    Ok(quote! {
        #header
        #input
    }
    .into())
}

enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl ToTokens for Level {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        tokens.extend(match self {
            Level::Trace => quote! { ::tracing_devslog::private::Level::TRACE },
            Level::Debug => quote! { ::tracing_devslog::private::Level::DEBUG },
            Level::Info => quote! { ::tracing_devslog::private::Level::INFO },
            Level::Warn => quote! { ::tracing_devslog::private::Level::WARN },
            Level::Error => quote! { ::tracing_devslog::private::Level::ERROR },
        })
    }
}

struct Config {
    level: Option<Level>,
    is_test: bool,
}

impl Config {
    fn new(is_test: bool) -> Self {
        Config {
            level: None,
            is_test,
        }
    }

    fn parse(args: AttributeArgs, is_test: bool) -> syn::Result<Self> {
        let mut config = Config::new(is_test);

        for arg in args {
            match arg {
                syn::NestedMeta::Meta(syn::Meta::NameValue(namevalue)) => {
                    let ident = namevalue
                        .path
                        .get_ident()
                        .ok_or_else(|| {
                            syn::Error::new_spanned(&namevalue, "Must have a specified ident")
                        })?
                        .to_string()
                        .to_lowercase();
                    match ident.as_str() {
                        "level" => config.set_level(&namevalue)?,
                        name => {
                            let message = format!(
                                "Unknown argument `{}` is specified; expected: `level`",
                                name,
                            );
                            return Err(syn::Error::new_spanned(namevalue, message));
                        }
                    }
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "Unknown argument inside the macro",
                    ));
                }
            }
        }

        Ok(config)
    }

    fn set_level(&mut self, namevalue: &syn::MetaNameValue) -> syn::Result<()> {
        if self.level.is_some() {
            return Err(syn::Error::new_spanned(
                namevalue,
                "Argument `level` is defined multiple times",
            ));
        }

        let s = match &namevalue.lit {
            syn::Lit::Str(s) => s,
            _ => {
                return Err(syn::Error::new_spanned(
                    &namevalue.lit,
                    "Argument `level` expects a string literal value",
                ))
            }
        };

        self.level = Some(match s.value().to_lowercase().as_str() {
            "trace" => Level::Trace,
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" => Level::Warn,
            "error" => Level::Error,
            value => {
                let msg = format!(
                    "Argument `level` expects one of `trace`, `debug`, `info`, `warn` or `error`, but found: `{}`",
                    value
                );
                return Err(syn::Error::new_spanned(&namevalue.lit, msg));
            }
        });
        Ok(())
    }

    fn builder(self) -> proc_macro2::TokenStream {
        let mut builder = quote! { ::tracing_devslog::builder() };

        if self.is_test {
            builder = quote! { #builder.with_test_writer() };
        }

        if let Some(level) = self.level {
            builder = quote! { #builder.with_level(#level) };
        }

        quote! { #builder.into_subscriber() }
    }
}
