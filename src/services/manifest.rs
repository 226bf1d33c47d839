use serde::Serialize;

use crate::models::Role;
use crate::services::ActionKind;

/// A read-only collection a dashboard loads from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Plans,
    MySubscriptions,
    CurrentBill,
    MySubscribeRequests,
    MyPauseRequests,
    MyComplaints,
    TodayRoute,
    DeliveryStats,
    ComplaintQueue,
    SubscribeQueue,
    ChangeQueue,
    PauseQueue,
    Bills,
    ManagerStats,
    Customers,
    AllSubscriptions,
    Deliveries,
    CommissionReport,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Plans => "/api/plans/",
            Resource::MySubscriptions => "/api/customer/subscriptions/",
            Resource::CurrentBill => "/api/customer/bills/current-month/",
            Resource::MySubscribeRequests => "/api/customer/subscribe-requests/",
            Resource::MyPauseRequests => "/api/customer/pause-requests/",
            Resource::MyComplaints => "/api/customer/my-complaints/",
            Resource::TodayRoute => "/api/delivery/today/summary/",
            Resource::DeliveryStats => "/api/delivery/stats/",
            Resource::ComplaintQueue => "/api/cse/complaints/",
            Resource::SubscribeQueue => "/api/sm/requests/subscribe/",
            Resource::ChangeQueue => "/api/sm/requests/change/",
            Resource::PauseQueue => "/api/sm/requests/pause/",
            Resource::Bills => "/api/manager/bills/",
            Resource::ManagerStats => "/api/manager/stats/",
            Resource::Customers => "/api/manager/customers/",
            Resource::AllSubscriptions => "/api/manager/subscriptions/",
            Resource::Deliveries => "/api/manager/deliveries/",
            Resource::CommissionReport => "/api/manager/commission-report/",
        }
    }

    /// Wording used when this collection could not be loaded.
    pub fn label(self) -> &'static str {
        match self {
            Resource::Plans => "plans",
            Resource::MySubscriptions | Resource::AllSubscriptions => "subscriptions",
            Resource::CurrentBill => "current bill",
            Resource::MySubscribeRequests | Resource::SubscribeQueue => "subscribe requests",
            Resource::ChangeQueue => "change requests",
            Resource::MyPauseRequests | Resource::PauseQueue => "pause requests",
            Resource::MyComplaints | Resource::ComplaintQueue => "complaints",
            Resource::TodayRoute => "today's route",
            Resource::DeliveryStats => "delivery stats",
            Resource::Bills => "bills",
            Resource::ManagerStats => "stats",
            Resource::Customers => "customers",
            Resource::Deliveries => "deliveries",
            Resource::CommissionReport => "commission report",
        }
    }
}

/// What one role's dashboard loads and what it may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Manifest {
    pub role: Role,
    pub resources: &'static [Resource],
    pub actions: &'static [ActionKind],
}

const CUSTOMER: Manifest = Manifest {
    role: Role::Customer,
    resources: &[
        Resource::Plans,
        Resource::MySubscriptions,
        Resource::CurrentBill,
        Resource::MySubscribeRequests,
        Resource::MyPauseRequests,
        Resource::MyComplaints,
    ],
    actions: &[
        ActionKind::Subscribe,
        ActionKind::RequestChange,
        ActionKind::RequestPause,
        ActionKind::FileComplaint,
    ],
};

const DELIVERY: Manifest = Manifest {
    role: Role::Delivery,
    resources: &[Resource::TodayRoute, Resource::DeliveryStats],
    actions: &[ActionKind::MarkDelivered],
};

const CSE: Manifest = Manifest {
    role: Role::Cse,
    resources: &[Resource::ComplaintQueue],
    actions: &[ActionKind::SetComplaintStatus, ActionKind::ReplyComplaint],
};

const SUBSCRIPTION_MANAGER: Manifest = Manifest {
    role: Role::SubscriptionManager,
    resources: &[
        Resource::Plans,
        Resource::SubscribeQueue,
        Resource::ChangeQueue,
        Resource::PauseQueue,
        Resource::Bills,
    ],
    actions: &[
        ActionKind::CreatePlan,
        ActionKind::UpdatePlan,
        ActionKind::DeletePlan,
        ActionKind::Resolve,
        ActionKind::GenerateBills,
        ActionKind::MarkBillPaid,
    ],
};

const MANAGER: Manifest = Manifest {
    role: Role::Manager,
    resources: &[
        Resource::ManagerStats,
        Resource::Customers,
        Resource::AllSubscriptions,
        Resource::Deliveries,
        Resource::Bills,
        Resource::CommissionReport,
    ],
    actions: &[
        ActionKind::GenerateBills,
        ActionKind::MarkBillPaid,
        ActionKind::ComputeCommission,
        ActionKind::SendReminders,
    ],
};

const NONE: Manifest = Manifest {
    role: Role::Unknown,
    resources: &[],
    actions: &[],
};

impl Manifest {
    pub fn for_role(role: Role) -> &'static Manifest {
        match role {
            Role::Customer => &CUSTOMER,
            Role::Delivery => &DELIVERY,
            Role::Cse => &CSE,
            Role::SubscriptionManager => &SUBSCRIPTION_MANAGER,
            Role::Manager => &MANAGER,
            Role::Unknown => &NONE,
        }
    }

    pub fn allows(&self, kind: ActionKind) -> bool {
        self.actions.contains(&kind)
    }
}
