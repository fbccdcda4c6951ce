//! Sample domain shared by the test modules.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::info::{Collection, NonStreamable};
use crate::ptr::Pointee;
use crate::registry::Registry;
use crate::{Ptr, ReflectError};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Date {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl Date {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sample {
    pub name: String,
    pub ratio: f32,
    pub tags: Vec<String>,
    pub dates: Vec<Date>,
    pub origin: Point,
    pub circular_ref: Ptr<Sample>,
    pub other: Ptr<Sample>,
    pub notes: Vec<String>,
    pub cache: u32,
    secret: String,
}

impl Sample {
    pub fn secret(&self) -> String {
        self.secret.clone()
    }

    pub fn set_secret(&mut self, secret: String) {
        self.secret = secret;
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.name, self.tags.len())
    }

    pub fn add_note(&mut self, note: String) {
        self.notes.push(note);
    }
}

/// A custom sequence type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    pub entries: Vec<i64>,
}

impl Collection for Ledger {
    type Item = i64;

    fn items(&self) -> Box<dyn Iterator<Item = &i64> + '_> {
        Box::new(self.entries.iter())
    }

    fn insert_at_end(&mut self, item: i64) {
        self.entries.push(item);
    }

    fn clear_all(&mut self) {
        self.entries.clear();
    }
}

/// Extends [`Sample`] by composition.
#[derive(Debug, Clone, Default)]
pub struct SampleDerived {
    pub base: Sample,
    pub level: u8,
    pub ledger: Ledger,
}

#[derive(Debug, Clone, Default)]
pub struct Pair {
    pub left: Ptr<Point>,
    pub right: Ptr<Point>,
}

impl Pair {
    fn left(&self) -> Ptr<Point> {
        self.left.clone()
    }

    fn set_left(&mut self, left: Ptr<Point>) {
        self.left = left;
    }
}

pub trait Shape: Pointee {
    fn area(&self) -> f64;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

impl Shape for Circle {
    fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Square {
    pub side: f64,
}

impl Shape for Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }
}

/// Carries a read-only field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Badge {
    pub id: u32,
    pub code: String,
}

/// A type-level annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category(pub &'static str);

#[derive(Debug, Default)]
pub struct Drawing {
    pub shapes: Vec<Ptr<dyn Shape>>,
    pub primary: Ptr<dyn Shape>,
}

/// Declares the sample domain.
///
/// `Sample` comes before `Vec<Date>` and `Date`, so its `dates` property is
/// bound late.
pub fn declare(registry: &mut Registry) -> Result<(), ReflectError> {
    registry
        .declare::<Point>()?
        .field("x", |p| &p.x, |p| &mut p.x)
        .field("y", |p| &p.y, |p| &mut p.y);

    registry
        .declare::<Sample>()?
        .field("name", |s| &s.name, |s| &mut s.name)
        .field("ratio", |s| &s.ratio, |s| &mut s.ratio)
        .field("tags", |s| &s.tags, |s| &mut s.tags)
        .field("dates", |s| &s.dates, |s| &mut s.dates)
        .field("origin", |s| &s.origin, |s| &mut s.origin)
        .field("circular_ref", |s| &s.circular_ref, |s| &mut s.circular_ref)
        .field("other", |s| &s.other, |s| &mut s.other)
        .property("secret", Sample::secret, Sample::set_secret)
        .getter("label", Sample::label)
        .setter("note", Sample::add_note)
        .field("cache", |s| &s.cache, |s| &mut s.cache)
        .annotate("cache", NonStreamable);

    registry.declare_collection::<Vec<String>>()?;
    registry.declare_collection::<Vec<Date>>()?;
    registry
        .declare::<Date>()?
        .field("year", |d| &d.year, |d| &mut d.year)
        .field("month", |d| &d.month, |d| &mut d.month)
        .field("day", |d| &d.day, |d| &mut d.day);

    registry.declare_collection::<Ledger>()?;
    registry
        .declare::<SampleDerived>()?
        .field("base", |s| &s.base, |s| &mut s.base)
        .field("level", |s| &s.level, |s| &mut s.level)
        .field("ledger", |s| &s.ledger, |s| &mut s.ledger);

    registry
        .declare::<Pair>()?
        .pointer("left", Pair::left, Pair::set_left)
        .field("right", |p| &p.right, |p| &mut p.right);

    registry
        .declare::<Badge>()?
        .getter_ref("id", |b| &b.id)
        .field("code", |b| &b.code, |b| &mut b.code)
        .annotate_type(Category("identity"));

    registry.declare_abstract::<dyn Shape>()?;
    registry
        .declare::<Circle>()?
        .field("radius", |c| &c.radius, |c| &mut c.radius)
        .getter("area", |c| c.area())
        .upcast::<dyn Shape>(|rc| rc);
    registry
        .declare::<Square>()?
        .field("side", |s| &s.side, |s| &mut s.side)
        .upcast::<dyn Shape>(|rc| rc);
    registry.declare_collection::<Vec<Ptr<dyn Shape>>>()?;
    registry
        .declare::<Drawing>()?
        .field("shapes", |d| &d.shapes, |d| &mut d.shapes)
        .field("primary", |d| &d.primary, |d| &mut d.primary);

    Ok(())
}

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    declare(&mut registry).expect("sample domain declares");
    registry
}

/// A sample with every kind of property filled in.
pub fn sample() -> Sample {
    let mut sample = Sample {
        name: String::from("first \"sample\"\n"),
        ratio: 0.25,
        tags: vec![String::from("a"), String::from("b\tc")],
        dates: vec![Date::new(2024, 2, 29), Date::new(1999, 12, 31)],
        origin: Point { x: 1.5, y: -2.0 },
        cache: 99,
        ..Sample::default()
    };
    sample.set_secret(String::from("hunter2"));
    sample
}
