/// Build an [`Instance`](crate::instance::Instance) declaring the listed capabilities
///
/// ```ignore
/// let instance = component!(EnglishGreeter::default(); dyn Greeter, dyn PrimaryComponent);
/// ```
#[macro_export]
macro_rules! component {
    ($value:expr $(; $($iface:ty),+ $(,)?)?) => {
        $crate::instance::Instance::builder($value)
            $($(.implements::<$iface>(|c| c))+)?
            .build()
    };
}
