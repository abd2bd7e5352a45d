use super::entity;
use super::students::GENDERS;
use crate::api::computed;
use crate::database::schema::{
    EntitySchema, FieldDef, FilterDef, Hop, JoinDef, OrderDef, Partition, Stamps,
};

pub const POSITIONS: &[&str] = &[
    "professor",
    "associate_professor",
    "assistant_professor",
    "lecturer",
    "instructor",
    "visiting_professor",
];
pub const FACULTY_STATUSES: &[&str] = &["active", "inactive", "retired", "on_leave"];
pub const DEGREE_TYPES: &[&str] = &["bachelors", "masters", "phd", "postdoc", "certificate"];
pub const LEAVE_TYPES: &[&str] = &[
    "annual",
    "sick",
    "maternity",
    "paternity",
    "sabbatical",
    "emergency",
    "unpaid",
];
pub const LEAVE_STATUSES: &[&str] = &["pending", "approved", "rejected", "cancelled"];

const VIA_FACULTY: &[Hop] = &[Hop { column: "faculty", table: "faculty" }];

pub static FACULTY: EntitySchema = EntitySchema {
    name: "faculty member",
    table: "faculty",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("user", "users").nullable().unique(),
        FieldDef::text("faculty_id", 20).unique(),
        FieldDef::owner("department", "departments"),
        FieldDef::text("first_name", 50),
        FieldDef::text("last_name", 50),
        FieldDef::text("middle_name", 50).blank(),
        FieldDef::date("date_of_birth"),
        FieldDef::choice("gender", GENDERS),
        FieldDef::text("phone", 20),
        FieldDef::email("email"),
        FieldDef::long_text("address"),
        FieldDef::choice("position", POSITIONS),
        FieldDef::date("hire_date"),
        FieldDef::text("office_location", 100).blank(),
        FieldDef::text("office_phone", 20).blank(),
        FieldDef::text("specialization", 200),
        FieldDef::long_text("education_qualifications"),
        FieldDef::integer("experience_years").default_int(0),
        FieldDef::decimal("salary", 10, 2).nullable(),
        FieldDef::choice("status", FACULTY_STATUSES).default_str("active"),
        FieldDef::long_text("research_interests").blank(),
        FieldDef::long_text("publications").blank(),
    ],
    stamps: Stamps::STANDARD,
    unique_together: &[],
    joins: &[JoinDef {
        name: "department_name",
        path: &[Hop { column: "department", table: "departments" }],
        column: "name",
    }],
    counts: &[],
    filters: &[
        FilterDef::exact("department"),
        FilterDef::exact("position"),
        FilterDef::exact("status"),
    ],
    order: &[OrderDef::asc("faculty_id")],
    computed: Some(computed::person_fields),
    hook: None,
    triggers: &[],
};

pub static QUALIFICATION: EntitySchema = EntitySchema {
    name: "qualification",
    table: "qualifications",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("faculty", "faculty"),
        FieldDef::choice("degree_type", DEGREE_TYPES),
        FieldDef::text("degree_name", 100),
        FieldDef::text("institution", 200),
        FieldDef::integer("year_obtained"),
        FieldDef::text("specialization", 200).blank(),
        FieldDef::text("grade", 20).blank(),
    ],
    stamps: Stamps::CREATED_ONLY,
    unique_together: &[],
    joins: &[
        JoinDef { name: "faculty_name", path: VIA_FACULTY, column: "first_name" },
        JoinDef { name: "faculty_code", path: VIA_FACULTY, column: "faculty_id" },
    ],
    counts: &[],
    filters: &[FilterDef::exact("faculty"), FilterDef::exact("degree_type")],
    order: &[OrderDef::desc("year_obtained")],
    computed: None,
    hook: None,
    triggers: &[],
};

pub static LEAVE: EntitySchema = EntitySchema {
    name: "leave",
    table: "leaves",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("faculty", "faculty"),
        FieldDef::choice("leave_type", LEAVE_TYPES),
        FieldDef::date("start_date"),
        FieldDef::date("end_date"),
        FieldDef::long_text("reason"),
        FieldDef::choice("status", LEAVE_STATUSES).default_str("pending"),
        FieldDef::nullable_ref("approved_by", "users"),
        FieldDef::datetime("approved_on").nullable(),
        FieldDef::long_text("remarks").blank(),
    ],
    stamps: Stamps::created("applied_on"),
    unique_together: &[],
    joins: &[
        JoinDef { name: "faculty_name", path: VIA_FACULTY, column: "first_name" },
        JoinDef { name: "faculty_code", path: VIA_FACULTY, column: "faculty_id" },
        JoinDef {
            name: "approved_by_name",
            path: &[Hop { column: "approved_by", table: "users" }],
            column: "username",
        },
    ],
    counts: &[],
    filters: &[
        FilterDef::exact("faculty"),
        FilterDef::exact("status"),
        FilterDef::exact("leave_type"),
    ],
    order: &[OrderDef::desc("applied_on")],
    computed: None,
    hook: None,
    triggers: &[],
};

entity!(FacultyMembers, FACULTY);
entity!(Qualifications, QUALIFICATION);
entity!(Leaves, LEAVE);
