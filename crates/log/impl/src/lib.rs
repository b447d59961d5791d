use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2, TokenTree};
use quote::quote;
use syn::{
    parse::Parser, parse_macro_input, punctuated::Punctuated, spanned::Spanned, FnArg,
    GenericParam, ItemFn, LitStr, Pat, ReturnType, Token, Type,
};

#[derive(Default)]
struct LogOptions {
    ignored: Vec<String>,
    named: Vec<String>,
    defaults: Vec<(String, String)>,
}

macro_rules! macro_error {
    ($msg:expr, $span:expr) => {
        syn::Error::new($span, $msg).to_compile_error().into()
    };
}

/// Prints a banner block with the name, parameters, defaults, arguments,
/// return value and elapsed time of every call of the annotated function.
///
/// Options are string literals:
/// - `"except a b"`: print `ignored` instead of the values of `a` and `b`.
/// - `"named a b"`: print `a` and `b` as named arguments.
/// - `"default a=1 b=2"`: show default values for trailing parameters. A
///   value runs up to the next `name=` word, so it may contain spaces.
#[proc_macro_attribute]
pub fn log_call(attr: TokenStream, input: TokenStream) -> TokenStream {
    // ItemFn also covers methods for they both have sig and block.
    let fn_decl = parse_macro_input!(input as ItemFn);
    let fn_ident = &fn_decl.sig.ident;

    let fn_async_trait = fn_decl.sig.generics.params.iter().any(|p| match p {
        GenericParam::Lifetime(x) => x.lifetime.ident == "async_trait",
        _ => false,
    });
    if fn_async_trait {
        return macro_error!(
            "log_call cannot wrap a method already rewritten by #[async_trait]",
            fn_ident.span()
        );
    }
    if let Some(constness) = &fn_decl.sig.constness {
        return macro_error!("log_call cannot wrap a const fn", constness.span());
    }

    let args = match Punctuated::<LitStr, Token![,]>::parse_terminated.parse(attr) {
        Ok(args) => args,
        Err(e) => return e.to_compile_error().into(),
    };
    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(e) => return e.to_compile_error().into(),
    };

    let params = match collect_params(&fn_decl) {
        Ok(params) => params,
        Err(e) => return e.to_compile_error().into(),
    };
    if let Err(e) = check_options(&options, &params, fn_ident) {
        return e.to_compile_error().into();
    }

    let signature = generate_signature(fn_ident, &params, &options);
    let args_refs = generate_args(&params, &options);
    let call = generate_call(&fn_decl);

    let attrs = &fn_decl.attrs;
    let vis = &fn_decl.vis;
    let sig = &fn_decl.sig;

    quote! {
        #(#attrs)*
        #vis #sig {
            static __CALL_LOG: ::call_log::__private::Lazy<::call_log::CallLogger> =
                ::call_log::__private::Lazy::new(|| ::call_log::CallLogger::trusted(#signature));
            let __call = __CALL_LOG.enter(&[#(#args_refs),*]);
            #call
        }
    }
    .into()
}

fn parse_options(args: &Punctuated<LitStr, Token![,]>) -> syn::Result<LogOptions> {
    let mut options = LogOptions::default();
    for arg in args {
        let value = arg.value();
        let value = value.trim();
        let (keyword, rest) = value
            .split_once(char::is_whitespace)
            .unwrap_or((value, ""));
        match keyword {
            "except" => options
                .ignored
                .extend(rest.split_whitespace().map(str::to_string)),
            "named" => options
                .named
                .extend(rest.split_whitespace().map(str::to_string)),
            "default" => match split_defaults(rest) {
                Ok(defaults) => options.defaults.extend(defaults),
                Err(e) => return Err(syn::Error::new(arg.span(), e)),
            },
            _ => return Err(syn::Error::new(arg.span(), "unknown logging option")),
        }
    }
    Ok(options)
}

/// Splits `a=1 b=vec![1, 2]` into names and value texts. A new default starts
/// at every word beginning with `identifier=`, so values may hold spaces.
fn split_defaults(text: &str) -> Result<Vec<(String, String)>, String> {
    let mut starts: Vec<(usize, &str)> = vec![];
    let mut after_space = true;
    for (i, c) in text.char_indices() {
        if after_space && !c.is_whitespace() {
            if let Some(name) = default_name(&text[i..]) {
                starts.push((i, name));
            }
        }
        after_space = c.is_whitespace();
    }

    let head = &text[..starts.first().map_or(text.len(), |(i, _)| *i)];
    if !head.trim().is_empty() {
        return Err(format!(
            "expected `name=value` in default option, found `{}`",
            head.trim()
        ));
    }

    let mut defaults = vec![];
    for (n, (start, name)) in starts.iter().enumerate() {
        let end = starts.get(n + 1).map_or(text.len(), |(i, _)| *i);
        let value = text[start + name.len() + 1..end].trim();
        if value.is_empty() {
            return Err(format!("missing value for default of `{}`", name));
        }
        defaults.push((name.to_string(), value.to_string()));
    }
    Ok(defaults)
}

fn default_name(word: &str) -> Option<&str> {
    let (name, _) = word.split_once('=')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    let is_ident = (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    is_ident.then_some(name)
}

/// Names of the typed parameters in declaration order. Receivers are left
/// out, any pattern other than a plain identifier is rejected.
fn collect_params(fn_decl: &ItemFn) -> syn::Result<Vec<Ident>> {
    fn_decl
        .sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Receiver(_) => None,
            FnArg::Typed(pat_type) => Some(match &*pat_type.pat {
                Pat::Ident(p) if p.subpat.is_none() && p.by_ref.is_none() => Ok(p.ident.clone()),
                other => Err(syn::Error::new(
                    other.span(),
                    "log_call needs a plain identifier for every parameter",
                )),
            }),
        })
        .collect()
}

fn check_options(options: &LogOptions, params: &[Ident], fn_ident: &Ident) -> syn::Result<()> {
    let declared = |name: &str| params.iter().any(|p| p == name);

    let mentioned = options
        .ignored
        .iter()
        .chain(options.named.iter())
        .chain(options.defaults.iter().map(|(name, _)| name));
    for name in mentioned {
        if !declared(name.as_str()) {
            return Err(syn::Error::new(
                Span::call_site(),
                format!("`{}` is not a parameter of `{}`", name, fn_ident),
            ));
        }
    }

    // defaults belong to the trailing parameters
    let has_default = |p: &Ident| options.defaults.iter().any(|(name, _)| p == name);
    if let Some(first) = params.iter().position(has_default) {
        if let Some(p) = params[first..].iter().find(|&p| !has_default(p)) {
            return Err(syn::Error::new(
                p.span(),
                format!(
                    "parameter `{}` needs a default because an earlier parameter has one",
                    p
                ),
            ));
        }
    }

    Ok(())
}

fn generate_signature(fn_ident: &Ident, params: &[Ident], options: &LogOptions) -> TokenStream2 {
    let fn_name = fn_ident.to_string();
    let mut signature = quote! {
        ::call_log::Signature::new(#fn_name)
    };

    for p in params {
        let name = p.to_string();
        if options.named.contains(&name) {
            signature.extend(quote!(.named(#name)));
        } else {
            signature.extend(quote!(.param(#name)));
        }
    }
    for (name, text) in &options.defaults {
        signature.extend(quote!(.default_text(#name, #text)));
    }

    signature
}

fn generate_args(params: &[Ident], options: &LogOptions) -> Vec<TokenStream2> {
    params
        .iter()
        .map(|ident| {
            if options.ignored.contains(&ident.to_string()) {
                quote!(&::call_log::Ignored as &dyn ::call_log::Loggable)
            } else {
                quote!(&#ident as &dyn ::call_log::Loggable)
            }
        })
        .collect()
}

/// Runs the original body as a closure, or an async block for async fns, so
/// that every `return` and `?` inside it ends up at the logger.
fn generate_call(fn_decl: &ItemFn) -> TokenStream2 {
    let block = &fn_decl.block;

    if fn_decl.sig.asyncness.is_some() {
        return quote! {
            __call.finish_async(async move #block).await
        };
    }

    // closures can't name `impl Trait` and get elided lifetimes wrong, so
    // those return types are left to inference
    let ret = match &fn_decl.sig.output {
        ReturnType::Default => quote!(-> ()),
        ReturnType::Type(_, ty) if !needs_inference(ty) => quote!(-> #ty),
        ReturnType::Type(..) => TokenStream2::new(),
    };
    quote! {
        __call.finish(move || #ret #block)
    }
}

fn needs_inference(ty: &Type) -> bool {
    fn scan(tokens: TokenStream2) -> bool {
        tokens.into_iter().any(|tt| match tt {
            TokenTree::Group(g) => scan(g.stream()),
            TokenTree::Punct(p) => p.as_char() == '&' || p.as_char() == '\'',
            TokenTree::Ident(i) => i == "impl" || i == "_",
            TokenTree::Literal(_) => false,
        })
    }
    scan(quote!(#ty))
}
