pub trait Apply {
	fn apply<F, R>(self, f: F) -> R
	where
		Self: Sized,
		F: FnOnce(Self) -> R,
	{
		f(self)
	}
}

impl<T: ?Sized> Apply for T {}

pub trait Also: Sized {
	fn also_mut<F>(mut self, f: F) -> Self
	where
		F: FnOnce(&mut Self),
	{
		f(&mut self);
		self
	}
}

impl<T> Also for T {}
