/// Identifies one outbound feed request.
///
/// Tokens are issued in strictly increasing order; a response is only applied
/// when its token is still the latest one issued.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(pub u64);

impl RequestToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}
