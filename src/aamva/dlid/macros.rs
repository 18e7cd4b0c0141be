macro_rules! data_elements_enum {
	($(#[$enum_meta:meta])* $vis:vis enum $enum_id:ident { $($(#[$meta:meta])* $id:ident : $tag:literal),* }) => {
		$(#[$enum_meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
		$vis enum $enum_id {
			$($(#[$meta])* $id),*
		}

		impl $enum_id {
			pub const COUNT: usize = $crate::aamva::dlid::data_elements_enum!(@count $($id,)*);
			pub const LIST: [Self; Self::COUNT] = [$(Self::$id),*];

			pub fn from_id(id: &[u8; 3]) -> Option<Self> {
				match id {
					$($tag => Some(Self::$id),)*
					_ => None
				}
			}

			pub fn id(&self) -> &'static [u8; 3] {
				match self {
					$(Self::$id => $tag),*
				}
			}

			pub fn string_id(&self) -> &'static str {
				unsafe {
					// SAFETY: every tag literal is three ASCII letters.
					std::str::from_utf8_unchecked(self.id())
				}
			}
		}

		impl std::fmt::Display for $enum_id {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str(self.string_id())
			}
		}

		impl std::str::FromStr for $enum_id {
			type Err = $crate::aamva::dlid::UnknownTag;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				<&[u8; 3]>::try_from(s.as_bytes())
					.ok()
					.and_then(Self::from_id)
					.ok_or_else(|| $crate::aamva::dlid::UnknownTag(s.to_owned()))
			}
		}

		impl serde::Serialize for $enum_id {
			fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
				serializer.serialize_str(self.string_id())
			}
		}

		impl<'de> serde::Deserialize<'de> for $enum_id {
			fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
				let s = String::deserialize(deserializer)?;
				s.parse().map_err(serde::de::Error::custom)
			}
		}
	};
	(@count $a:ident, $($rest:ident,)*) => {
		1usize + $crate::aamva::dlid::data_elements_enum!(@count $($rest,)*)
	};
	(@count) => {
		0usize
	}
}

pub(crate) use data_elements_enum;
