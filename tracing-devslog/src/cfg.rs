#[doc(hidden)]
#[macro_export]
macro_rules! cfg_env_filter {
    ($($item:item)*) => {
        $(
            #[cfg(feature = "env-filter")]
            #[cfg_attr(docsrs, doc(cfg(feature = "env-filter")))]
            $item
        )*
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! cfg_attributes {
    ($($item:item)*) => {
        $(
            #[cfg(feature = "attributes")]
            #[cfg_attr(docsrs, doc(cfg(feature = "attributes")))]
            $item
        )*
    }
}
