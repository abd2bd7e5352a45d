use super::entity;
use crate::api::computed;
use crate::database::schema::{
    CountDef, EntitySchema, FieldDef, FilterDef, Hop, JoinDef, OrderDef, Partition, Stamps,
};

pub const GENDERS: &[&str] = &["male", "female"];
pub const ACADEMIC_LEVELS: &[&str] = &["undergraduate", "graduate", "postgraduate", "phd"];
pub const STUDENT_STATUSES: &[&str] = &["active", "inactive", "graduated", "suspended", "transferred"];

const VIA_DEPARTMENT: &[Hop] = &[Hop { column: "department", table: "departments" }];
const VIA_STUDENT: &[Hop] = &[Hop { column: "student", table: "students" }];

pub static DEPARTMENT: EntitySchema = EntitySchema {
    name: "department",
    table: "departments",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::text("name", 100),
        FieldDef::text("code", 20).unique(),
        FieldDef::long_text("description").blank(),
    ],
    stamps: Stamps::STANDARD,
    unique_together: &[],
    joins: &[],
    counts: &[CountDef { name: "student_count", table: "students", column: "department" }],
    filters: &[],
    order: &[OrderDef::asc("name")],
    computed: None,
    hook: None,
    triggers: &[],
};

pub static STUDENT: EntitySchema = EntitySchema {
    name: "student",
    table: "students",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("user", "users").nullable().unique(),
        FieldDef::text("student_id", 20).unique(),
        FieldDef::owner("department", "departments"),
        FieldDef::text("first_name", 50),
        FieldDef::text("last_name", 50),
        FieldDef::text("middle_name", 50).blank(),
        FieldDef::date("date_of_birth"),
        FieldDef::choice("gender", GENDERS),
        FieldDef::text("phone", 20),
        FieldDef::email("email"),
        FieldDef::long_text("address"),
        FieldDef::choice("academic_level", ACADEMIC_LEVELS),
        FieldDef::date("enrollment_date"),
        FieldDef::date("expected_graduation_date").nullable(),
        FieldDef::integer("current_semester").default_int(1),
        FieldDef::decimal("gpa", 4, 2).nullable(),
        FieldDef::choice("status", STUDENT_STATUSES).default_str("active"),
        FieldDef::text("emergency_contact_name", 100),
        FieldDef::text("emergency_contact_phone", 20),
        FieldDef::text("emergency_contact_relationship", 50),
    ],
    stamps: Stamps::STANDARD,
    unique_together: &[],
    joins: &[JoinDef { name: "department_name", path: VIA_DEPARTMENT, column: "name" }],
    counts: &[],
    filters: &[
        FilterDef::exact("department"),
        FilterDef::exact("status"),
        FilterDef::exact("academic_level"),
    ],
    order: &[OrderDef::asc("student_id")],
    computed: Some(computed::person_fields),
    hook: None,
    triggers: &[],
};

pub static ACADEMIC_RECORD: EntitySchema = EntitySchema {
    name: "academic record",
    table: "academic_records",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("student", "students"),
        FieldDef::integer("semester"),
        FieldDef::integer("year"),
        FieldDef::decimal("semester_gpa", 4, 2),
        FieldDef::decimal("cumulative_gpa", 4, 2),
        FieldDef::integer("credits_earned"),
        FieldDef::integer("total_credits"),
        FieldDef::text("academic_standing", 50),
    ],
    stamps: Stamps::CREATED_ONLY,
    unique_together: &[&["student", "semester", "year"]],
    joins: &[
        JoinDef { name: "student_name", path: VIA_STUDENT, column: "first_name" },
        JoinDef { name: "student_code", path: VIA_STUDENT, column: "student_id" },
    ],
    counts: &[],
    filters: &[FilterDef::exact("student"), FilterDef::integer("year")],
    order: &[OrderDef::desc("year"), OrderDef::desc("semester")],
    computed: None,
    hook: None,
    triggers: &[],
};

entity!(Departments, DEPARTMENT);
entity!(Students, STUDENT);
entity!(AcademicRecords, ACADEMIC_RECORD);
