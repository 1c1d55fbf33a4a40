//! Example entity types

use form_types::{
    downcast, shared, CommandDefinition, CommandError, Describe, Entity, EntityAccessError,
    EntityDefinition, EntityLink, EntityRef, MemberDefinition, Value, ValueType,
};
use std::any::Any;

fn text(value: &Option<String>) -> Value {
    value.clone().map_or(Value::Null, Value::Text)
}

fn text_input(member: &str, value: Value) -> Result<Option<String>, EntityAccessError> {
    match value {
        Value::Null => Ok(None),
        Value::Text(v) => Ok(Some(v)),
        value => Err(EntityAccessError::TypeMismatch {
            member: member.to_string(),
            value,
        }),
    }
}

fn linked_customer_id(link: &Option<EntityLink>) -> Value {
    link.as_ref()
        .and_then(|link| downcast::<Customer>(&*link.entity().borrow()).and_then(|c| c.id))
        .map_or(Value::Null, |id| Value::Reference(id.to_string()))
}

/// Null unlinks; the current link's own reference is accepted unchanged
fn relink(
    member: &str,
    link: &Option<EntityLink>,
    value: Value,
) -> Result<Option<EntityLink>, EntityAccessError> {
    match value {
        Value::Null => Ok(None),
        value if value == linked_customer_id(link) => Ok(link.clone()),
        value => Err(EntityAccessError::TypeMismatch {
            member: member.to_string(),
            value,
        }),
    }
}

fn integer_input(member: &str, value: Value) -> Result<Option<i64>, EntityAccessError> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(v) => Ok(Some(v)),
        value => Err(EntityAccessError::TypeMismatch {
            member: member.to_string(),
            value,
        }),
    }
}

/// Customer grade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientLevel {
    Bronze,
    Silver,
    Gold,
}

impl ClientLevel {
    /// Constant names in declaration order
    pub const NAMES: [&'static str; 3] = ["BRONZE", "SILVER", "GOLD"];

    pub fn name(&self) -> &'static str {
        match self {
            ClientLevel::Bronze => "BRONZE",
            ClientLevel::Silver => "SILVER",
            ClientLevel::Gold => "GOLD",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "BRONZE" => Some(ClientLevel::Bronze),
            "SILVER" => Some(ClientLevel::Silver),
            "GOLD" => Some(ClientLevel::Gold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Customer {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub level: Option<ClientLevel>,
    pub trade_deals: Vec<i64>,
}

impl Customer {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

fn customer_full_name(entity: &dyn Entity) -> String {
    downcast::<Customer>(entity)
        .map(|c| {
            format!(
                "{}:{}",
                c.name.as_deref().unwrap_or_default(),
                c.id.map(|id| id.to_string()).unwrap_or_default()
            )
        })
        .unwrap_or_default()
}

impl Entity for Customer {
    fn get_value(&self, member: &str) -> Result<Value, EntityAccessError> {
        match member {
            "id" => Ok(self.id.into()),
            "name" => Ok(text(&self.name)),
            "description" => Ok(text(&self.description)),
            "level" => Ok(self
                .level
                .map_or(Value::Null, |level| Value::Enum(level.name().to_string()))),
            "trade_deals" => Ok(Value::Integer(self.trade_deals.len() as i64)),
            other => Err(EntityAccessError::UnknownMember(other.to_string())),
        }
    }

    fn set_value(&mut self, member: &str, value: Value) -> Result<(), EntityAccessError> {
        match member {
            "id" => self.id = integer_input(member, value)?,
            "name" => self.name = text_input(member, value)?,
            "description" => self.description = text_input(member, value)?,
            "level" => {
                self.level = match value {
                    Value::Null => None,
                    Value::Enum(ref name) => Some(ClientLevel::from_name(name).ok_or_else(|| {
                        EntityAccessError::TypeMismatch {
                            member: member.to_string(),
                            value: value.clone(),
                        }
                    })?),
                    value => {
                        return Err(EntityAccessError::TypeMismatch {
                            member: member.to_string(),
                            value,
                        })
                    }
                }
            }
            "trade_deals" => return Err(EntityAccessError::NotWritable(member.to_string())),
            other => return Err(EntityAccessError::UnknownMember(other.to_string())),
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Describe for Customer {
    fn definition() -> EntityDefinition {
        EntityDefinition::standard("example.entity.Customer", "Customer")
            .menu_caption("Our Customers")
            .menu_path("/Trade")
            .identifier("id")
            .search_member("name")
            .member(
                MemberDefinition::field("id", ValueType::Integer)
                    .label("Identifier")
                    .order(-1),
            )
            .member(
                MemberDefinition::field("name", ValueType::Text)
                    .label("Customer caption")
                    .order(2),
            )
            .member(
                MemberDefinition::field("description", ValueType::Text)
                    .label("Customer description")
                    .long_text(),
            )
            .member(
                MemberDefinition::field("level", ValueType::enumeration(ClientLevel::NAMES))
                    .label("Client grade level"),
            )
            .member(MemberDefinition::field(
                "trade_deals",
                ValueType::other("Set<TradeDeal>"),
            ))
            .member(MemberDefinition::field("repository", ValueType::other("CustomerRepository")).injected())
            .representation(customer_full_name)
            .factory(|| shared(Customer::default()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub id: Option<i64>,
    pub comment: Option<String>,
    pub customer: Option<EntityLink>,
}

impl Entity for Contact {
    fn get_value(&self, member: &str) -> Result<Value, EntityAccessError> {
        match member {
            "id" => Ok(self.id.into()),
            "comment" => Ok(text(&self.comment)),
            "customer" => Ok(linked_customer_id(&self.customer)),
            other => Err(EntityAccessError::UnknownMember(other.to_string())),
        }
    }

    fn set_value(&mut self, member: &str, value: Value) -> Result<(), EntityAccessError> {
        match member {
            "id" => self.id = integer_input(member, value)?,
            "comment" => self.comment = text_input(member, value)?,
            "customer" => self.customer = relink(member, &self.customer, value)?,
            other => return Err(EntityAccessError::UnknownMember(other.to_string())),
        }
        Ok(())
    }

    fn related(&self, member: &str) -> Option<EntityRef> {
        match member {
            "customer" => self.customer.as_ref().map(|link| link.entity().clone()),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Describe for Contact {
    fn definition() -> EntityDefinition {
        EntityDefinition::standard("example.entity.Contact", "contact")
            .menu_caption("Contacts")
            .menu_path("/etc")
            .identifier("id")
            .search_member("id")
            .member(MemberDefinition::field("id", ValueType::Integer).order(3))
            .member(
                MemberDefinition::field("comment", ValueType::Text)
                    .label("Operator's comment")
                    .long_text()
                    .order(1),
            )
            .member(
                MemberDefinition::field("customer", ValueType::relation("example.entity.Customer"))
                    .label("Customer")
                    .order(-2),
            )
            .factory(|| shared(Contact::default()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeDeal {
    pub id: Option<i64>,
    pub sum: Option<f64>,
    pub discount: Option<f32>,
    pub customer: Option<EntityLink>,
}

fn net_sum(entity: &dyn Entity) -> String {
    downcast::<TradeDeal>(entity)
        .map(|deal| {
            let sum = deal.sum.unwrap_or(0.0);
            let discount = f64::from(deal.discount.unwrap_or(0.0));
            format!("{:.2}", sum * (1.0 - discount))
        })
        .unwrap_or_default()
}

fn trade_deal_representation(entity: &dyn Entity) -> String {
    downcast::<TradeDeal>(entity)
        .map(|deal| {
            let customer = deal
                .customer
                .as_ref()
                .map(|link| customer_full_name(&*link.entity().borrow()))
                .unwrap_or_default();
            format!(
                "{}:{} ${}",
                deal.id.map(|id| id.to_string()).unwrap_or_default(),
                customer,
                deal.sum.unwrap_or(0.0)
            )
        })
        .unwrap_or_default()
}

impl Entity for TradeDeal {
    fn get_value(&self, member: &str) -> Result<Value, EntityAccessError> {
        match member {
            "id" => Ok(self.id.into()),
            "sum" => Ok(self.sum.map_or(Value::Null, Value::Double)),
            "discount" => Ok(self.discount.map_or(Value::Null, Value::Float)),
            "customer" => Ok(linked_customer_id(&self.customer)),
            other => Err(EntityAccessError::UnknownMember(other.to_string())),
        }
    }

    fn set_value(&mut self, member: &str, value: Value) -> Result<(), EntityAccessError> {
        match (member, value) {
            ("id", value) => self.id = integer_input(member, value)?,
            ("sum", Value::Double(v)) => self.sum = Some(v),
            ("sum", Value::Null) => self.sum = None,
            ("discount", Value::Float(v)) => self.discount = Some(v),
            ("discount", Value::Null) => self.discount = None,
            ("customer", value) => self.customer = relink(member, &self.customer, value)?,
            ("sum" | "discount", value) => {
                return Err(EntityAccessError::TypeMismatch {
                    member: member.to_string(),
                    value,
                })
            }
            (other, _) => return Err(EntityAccessError::UnknownMember(other.to_string())),
        }
        Ok(())
    }

    fn related(&self, member: &str) -> Option<EntityRef> {
        match member {
            "customer" => self.customer.as_ref().map(|link| link.entity().clone()),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Describe for TradeDeal {
    fn definition() -> EntityDefinition {
        EntityDefinition::standard("example.entity.TradeDeal", "Trade deal")
            .menu_caption("Trade deals")
            .menu_path("/Trade")
            .identifier("id")
            .member(MemberDefinition::field("sum", ValueType::Double).label("Summ of the deal"))
            .member(MemberDefinition::field("discount", ValueType::Float).label("Discount"))
            .member(
                MemberDefinition::field("customer", ValueType::relation("example.entity.Customer"))
                    .label("Customer"),
            )
            .member(MemberDefinition::field("id", ValueType::Integer))
            .member(
                MemberDefinition::provider("net_sum", net_sum)
                    .label("Sum after discount")
                    .order(100),
            )
            .representation(trade_deal_representation)
            .factory(|| shared(TradeDeal::default()))
    }
}

/// Form with caller-declared commands and no identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calculator {
    pub a: Option<i64>,
    pub b: Option<i64>,
    pub result: Option<i64>,
}

fn calculator(entity: &mut dyn Entity) -> Result<&mut Calculator, CommandError> {
    form_types::downcast_mut::<Calculator>(entity)
        .ok_or_else(|| CommandError::new("Not a calculator"))
}

fn add(entity: &mut dyn Entity) -> Result<(), CommandError> {
    let calc = calculator(entity)?;
    calc.result = Some(calc.a.unwrap_or(0) + calc.b.unwrap_or(0));
    Ok(())
}

fn divide(entity: &mut dyn Entity) -> Result<(), CommandError> {
    let calc = calculator(entity)?;
    match calc.b {
        Some(0) | None => Err(CommandError::new("Division by zero")),
        Some(b) => {
            calc.result = Some(calc.a.unwrap_or(0) / b);
            Ok(())
        }
    }
}

impl Entity for Calculator {
    fn get_value(&self, member: &str) -> Result<Value, EntityAccessError> {
        match member {
            "a" => Ok(self.a.into()),
            "b" => Ok(self.b.into()),
            "result" => Ok(self.result.into()),
            other => Err(EntityAccessError::UnknownMember(other.to_string())),
        }
    }

    fn set_value(&mut self, member: &str, value: Value) -> Result<(), EntityAccessError> {
        match member {
            "a" => self.a = integer_input(member, value)?,
            "b" => self.b = integer_input(member, value)?,
            "result" => self.result = integer_input(member, value)?,
            other => return Err(EntityAccessError::UnknownMember(other.to_string())),
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Describe for Calculator {
    fn definition() -> EntityDefinition {
        EntityDefinition::custom_form("example.form.Calculator", "Calculator")
            .member(MemberDefinition::field("a", ValueType::Integer).order(1))
            .member(MemberDefinition::field("b", ValueType::Integer).order(2))
            .member(MemberDefinition::field("result", ValueType::Integer).order(3))
            .command(CommandDefinition::new("Add", add).with_icon("plus"))
            .command(CommandDefinition::new("Divide", divide))
    }
}

/// Entity registered without a role; cannot be shown
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Orphan {
    pub title: Option<String>,
}

impl Entity for Orphan {
    fn get_value(&self, member: &str) -> Result<Value, EntityAccessError> {
        match member {
            "title" => Ok(text(&self.title)),
            other => Err(EntityAccessError::UnknownMember(other.to_string())),
        }
    }

    fn set_value(&mut self, member: &str, value: Value) -> Result<(), EntityAccessError> {
        match member {
            "title" => self.title = text_input(member, value)?,
            other => return Err(EntityAccessError::UnknownMember(other.to_string())),
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Describe for Orphan {
    fn definition() -> EntityDefinition {
        EntityDefinition::new("example.entity.Orphan")
            .member(MemberDefinition::field("title", ValueType::Text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_level_roundtrip() {
        let mut customer = Customer::new("Acme");
        customer
            .set_value("level", Value::Enum("GOLD".to_string()))
            .unwrap();
        assert_eq!(customer.level, Some(ClientLevel::Gold));
        assert_eq!(
            customer.get_value("level").unwrap(),
            Value::Enum("GOLD".to_string())
        );
    }

    #[test]
    fn test_customer_rejects_unknown_level() {
        let mut customer = Customer::new("Acme");
        let err = customer
            .set_value("level", Value::Enum("PLATINUM".to_string()))
            .unwrap_err();
        assert!(matches!(err, EntityAccessError::TypeMismatch { .. }));
    }

    #[test]
    fn test_customer_representation() {
        let customer = Customer::new("Acme").with_id(3);
        assert_eq!(customer_full_name(&customer), "Acme:3");
    }

    #[test]
    fn test_calculator_commands() {
        let mut calc = Calculator {
            a: Some(9),
            b: Some(3),
            result: None,
        };
        add(&mut calc).unwrap();
        assert_eq!(calc.result, Some(12));
        divide(&mut calc).unwrap();
        assert_eq!(calc.result, Some(3));

        calc.b = Some(0);
        assert_eq!(divide(&mut calc), Err(CommandError::new("Division by zero")));
    }

    #[test]
    fn test_trade_deal_links_customer() {
        let acme = shared(Customer::new("Acme").with_id(7));
        let mut deal = TradeDeal {
            id: Some(2),
            sum: Some(10.0),
            customer: Some(EntityLink::new(acme)),
            ..TradeDeal::default()
        };
        assert_eq!(deal.get_value("customer").unwrap(), Value::Reference("7".to_string()));
        assert!(deal.related("customer").is_some());
        assert_eq!(trade_deal_representation(&deal), "2:Acme:7 $10");

        deal.set_value("customer", Value::Reference("7".to_string())).unwrap();
        assert!(deal.customer.is_some());
        let err = deal
            .set_value("customer", Value::Reference("8".to_string()))
            .unwrap_err();
        assert!(matches!(err, EntityAccessError::TypeMismatch { .. }));

        deal.set_value("customer", Value::Null).unwrap();
        assert!(deal.related("customer").is_none());
    }

    #[test]
    fn test_trade_deal_net_sum() {
        let deal = TradeDeal {
            sum: Some(200.0),
            discount: Some(0.25),
            ..TradeDeal::default()
        };
        assert_eq!(net_sum(&deal), "150.00");
    }
}
