use std::io;

#[cold]
#[inline(never)]
pub fn span_not_in_ctx<T>() -> T {
    panic!("Span not in context, this is a bug");
}

#[cold]
#[inline(never)]
pub fn handler_not_in_exts<T>() -> T {
    panic!("Span extension doesn't contain a `Handler`, this is a bug");
}

#[cold]
#[inline(never)]
pub fn write_error(err: &io::Error) {
    eprintln!("[tracing-devslog] Unable to write a record to the sink: {}", err);
}
