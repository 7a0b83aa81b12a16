//! Typed primary keys of the credential store

use kernel::id::Id;

pub struct UserAuthMarker;
pub type UserAuthId = Id<UserAuthMarker>;

pub struct UserProfileMarker;
pub type UserProfileId = Id<UserProfileMarker>;

pub struct RoleMarker;
pub type RoleId = Id<RoleMarker>;
