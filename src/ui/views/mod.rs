mod dashboard;
mod employee_detail;
mod employees;
mod login;
mod post_notice;
mod register;

pub use dashboard::DashboardView;
pub use employee_detail::EmployeeDetailView;
pub use employees::EmployeesView;
pub use login::LoginView;
pub use post_notice::PostNoticeView;
pub use register::RegisterView;

use crate::guards::Route;
use crate::ui::context::AppContext;
use crate::ui::view::View;

/// Mount the view for `route`. Guards are applied by the caller.
pub fn build(route: &Route, ctx: &AppContext) -> Box<dyn View> {
  let ctx = ctx.clone();
  match route {
    Route::Login => Box::new(LoginView::new(ctx)),
    Route::Register => Box::new(RegisterView::new(ctx)),
    Route::Dashboard => Box::new(DashboardView::new(ctx)),
    Route::Employees => Box::new(EmployeesView::new(ctx)),
    Route::EmployeeDetails { id } => Box::new(EmployeeDetailView::new(id.clone(), ctx)),
    Route::PostNotice => Box::new(PostNoticeView::new(ctx)),
  }
}
