// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A declarative macro for the usage-flag sets that cross the RHI boundary.
//!
//! The generated type is a transparent wrapper over an integer so it can be
//! passed through the C surface unchanged.

#[macro_export]
#[doc(hidden)]
macro_rules! vesta_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[repr(transparent)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// An empty set of flags.
            pub const EMPTY: Self = Self { bits: 0 };

            /// Every flag known to this set.
            pub const ALL: Self = Self { bits: 0 $(| $flag_value)* };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Builds a set from raw bits, rejecting bits that name no flag.
            pub const fn from_bits(bits: $ty) -> Option<Self> {
                if bits & !Self::ALL.bits == 0 {
                    Some(Self { bits })
                } else {
                    None
                }
            }

            /// Builds a set from raw bits, dropping bits that name no flag.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits: bits & Self::ALL.bits }
            }

            /// Returns the raw value of the set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if all flags in `other` are set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is set in `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Returns the union of both sets. Usable in constants.
            #[must_use]
            pub const fn union(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }

            /// Sets the flags in `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Clears the flags in `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::ops::BitAndAssign for $name {
            fn bitand_assign(&mut self, other: Self) {
                self.bits &= other.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{} {{ ", stringify!($name))?;
                if self.bits == 0 {
                    return write!(f, "EMPTY }}");
                }

                let mut remaining = self.bits;
                let mut first = true;
                $(
                    if $flag_value != 0 && (remaining & $flag_value) == $flag_value {
                        if !first {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", stringify!($flag_name))?;
                        remaining &= !$flag_value;
                        first = false;
                    }
                )*

                if remaining != 0 {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "UNKNOWN({:#x})", remaining)?;
                }

                write!(f, " }}")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::vesta_bitflags;

    vesta_bitflags! {
        /// Flags used only by these tests.
        pub struct StageMask: u32 {
            const VERTEX = 1 << 0;
            const PIXEL = 1 << 1;
            const COMPUTE = 1 << 2;
        }
    }

    #[test]
    fn test_empty_debug() {
        assert!(StageMask::EMPTY.is_empty());
        assert_eq!(StageMask::default(), StageMask::EMPTY);
        assert_eq!(format!("{:?}", StageMask::EMPTY), "StageMask { EMPTY }");
    }

    #[test]
    fn test_combination_debug_and_contains() {
        let mask = StageMask::VERTEX | StageMask::COMPUTE;
        assert_eq!(mask.bits(), 0b101);
        assert!(mask.contains(StageMask::VERTEX));
        assert!(!mask.contains(StageMask::PIXEL));
        assert!(mask.intersects(StageMask::PIXEL | StageMask::COMPUTE));
        assert_eq!(format!("{mask:?}"), "StageMask { VERTEX | COMPUTE }");
    }

    #[test]
    fn test_from_bits_rejects_unknown() {
        assert_eq!(StageMask::ALL.bits(), 0b111);
        assert_eq!(StageMask::from_bits(0b011), Some(StageMask::VERTEX | StageMask::PIXEL));
        assert_eq!(StageMask::from_bits(0b1000), None);
        assert_eq!(StageMask::from_bits_truncate(0b1001), StageMask::VERTEX);
    }

    #[test]
    fn test_insert_remove() {
        let mut mask = StageMask::PIXEL;
        mask.insert(StageMask::VERTEX);
        mask |= StageMask::COMPUTE;
        assert_eq!(mask, StageMask::ALL);
        mask.remove(StageMask::PIXEL);
        mask &= StageMask::VERTEX;
        assert_eq!(mask, StageMask::VERTEX);
    }
}
