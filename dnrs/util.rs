#[macro_export]
macro_rules! btreeset {
    ( $( $x:expr ),* $(,)? ) => {
        {
            #[allow(unused_mut)]
            let mut set = std::collections::BTreeSet::new();
            $(
                set.insert($x);
            )*
            set
        }
    };
}
