//! Convenience macros for working with button pin masks.
//!
//! This module provides declarative macros that simplify describing which
//! GPIO pins drive an endpoint and make configuration code more readable.

/// Creates a `u32` pin mask from a list of GPIO pin numbers.
///
/// The `pin_mask!` macro builds the mask that
/// [`SwitchEndpoint::set_configuration`](crate::endpoint::SwitchEndpoint::set_configuration)
/// expects, validating every pin number at compile time.
///
/// # Syntax
///
/// ```text
/// pin_mask!(pin, pin, ...)
/// ```
///
/// Where every `pin` is a GPIO number in `0..=31`.
///
/// # Examples
///
/// ```
/// use zigbee_switch::pin_mask;
///
/// // Single button on DIO4
/// let left = pin_mask!(4);
/// assert_eq!(left, 0x0000_0010);
///
/// // "Both buttons" endpoint on DIO4 + DIO5
/// let both = pin_mask!(4, 5);
/// assert_eq!(both, 0x0000_0030);
/// ```
///
/// # Compile-Time Validation
///
/// ```compile_fail
/// use zigbee_switch::pin_mask;
///
/// // This will fail to compile: pin > 31
/// let mask = pin_mask!(32);
/// ```
#[macro_export]
macro_rules! pin_mask {
    ($($pin:literal),+ $(,)?) => {{
        const MASK: u32 = {
            let mut mask = 0u32;
            $(
                if $pin > 31 {
                    panic!("Pin number must be 0-31");
                }
                mask |= 1u32 << $pin;
            )+
            mask
        };
        MASK
    }};
}
