pub mod memory_member_repository;

use crate::core::repository::Repository;
use crate::members::domain::model::Member;

pub trait MemberRepository: Repository<Member> {}
